// signed_ledger/verifying_server/src/service.rs

use shared_auth::{authenticate_request, AuthResult};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::ledger::Ledger;

/// Sent back for every request that is not accepted. The reason stays in the
/// server log.
pub const ERROR_RESPONSE: &str = "error";

/// Authenticates one request line and, if accepted, applies it to the ledger.
/// Returns the response line without its newline.
pub fn handle_line(line: &str, ledger: &dyn Ledger) -> String {
    let request = match authenticate_request(line) {
        (AuthResult::Accepted, Some(request)) => request,
        (result, _) => {
            warn!(%result, "request refused");
            return ERROR_RESPONSE.to_string();
        }
    };

    let message = &request.message;
    let balance = ledger.apply(&message.identity, message.operation, message.operand);
    info!(
        identity = %message.identity,
        operation = %message.operation,
        operand = message.operand,
        balance,
        "request served"
    );
    balance.to_string()
}

/// Serves request lines from `reader` until EOF, one response line each.
pub async fn serve_connection<R, W>(reader: R, mut writer: W, ledger: Arc<dyn Ledger>) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let response = handle_line(&line, ledger.as_ref());
        writer.write_all(response.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}
