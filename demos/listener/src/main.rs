//! Demo listener for amp broadcasts.
//!
//! Accepts WebSocket connections, logs every broadcast it receives and
//! answers each one with a short acknowledgement.
//!
//!   cargo run -p amp-listener -- --port 8080

mod server;

use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("amp_listener=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let port = parse_arg(&args, "--port").unwrap_or(8080);
    let quiet = args.iter().any(|a| a == "--quiet");

    let addr: SocketAddr = ([127, 0, 0, 1], port).into();
    tracing::info!("Starting listener on {}", addr);

    server::run(addr, !quiet).await
}

fn parse_arg(args: &[String], flag: &str) -> Option<u16> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
