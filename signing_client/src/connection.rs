// signed_ledger/signing_client/src/connection.rs

use anyhow::{anyhow, Context};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

/// Server reply to one request line.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Balance(i64),
    Refused,
}

/// One request line out, one reply line back.
pub struct Connection<R, W> {
    lines: Lines<R>,
    writer: W,
}

impl<R, W> Connection<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Connection {
            lines: reader.lines(),
            writer,
        }
    }

    pub async fn request(&mut self, line: &str) -> anyhow::Result<Reply> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        let reply = self
            .lines
            .next_line()
            .await?
            .ok_or_else(|| anyhow!("server closed the connection"))?;
        parse_reply(&reply)
    }
}

fn parse_reply(reply: &str) -> anyhow::Result<Reply> {
    if reply == "error" {
        return Ok(Reply::Refused);
    }
    reply
        .parse()
        .map(Reply::Balance)
        .with_context(|| format!("unexpected server reply `{}`", reply))
}
