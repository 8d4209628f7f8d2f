// signed_ledger/verifying_server/src/main.rs

mod ledger;
mod service;

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::ledger::{Ledger, MemoryLedger};

/// Verifies signed ledger requests and keeps a running balance per identity.
#[derive(Parser, Debug)]
#[command(name = "verifying_server", version)]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 7777)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let address = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("could not bind {}", address))?;
    info!(%address, "server started");

    let ledger: Arc<dyn Ledger> = Arc::new(MemoryLedger::new());

    loop {
        let (socket, peer) = listener.accept().await.context("accept failed")?;
        let ledger = Arc::clone(&ledger);
        info!(%peer, "client connected");

        tokio::spawn(async move {
            let (read_half, write_half) = socket.into_split();
            match service::serve_connection(BufReader::new(read_half), write_half, ledger).await {
                Ok(()) => info!(%peer, "client disconnected"),
                Err(e) => error!(%peer, error = %e, "connection failed"),
            }
        });
    }
}
