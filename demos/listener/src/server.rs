//! Listener implementation.

use amp_core::{BroadcastMessage, CompactMessage};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;

/// A frame received from a broadcaster.
#[derive(Debug)]
pub enum Received {
    Full(BroadcastMessage),
    Compact(CompactMessage),
    Raw(String),
}

impl Received {
    pub fn parse(text: &str) -> Self {
        if let Ok(msg) = serde_json::from_str::<BroadcastMessage>(text) {
            return Self::Full(msg);
        }
        if let Ok(msg) = serde_json::from_str::<CompactMessage>(text) {
            return Self::Compact(msg);
        }
        Self::Raw(text.to_string())
    }

    /// Reply sent back to the broadcaster.
    pub fn ack(&self) -> String {
        match self {
            Self::Full(msg) => format!("seen {} ({})", msg.file_name, msg.uptime),
            Self::Compact(msg) => format!("seen {} ({})", msg.file_name, msg.uptime),
            Self::Raw(_) => "seen".to_string(),
        }
    }
}

pub async fn run(addr: SocketAddr, ack: bool) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on ws://{}", addr);

    loop {
        let (stream, peer) = listener.accept().await?;
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer, ack).await {
                tracing::warn!("Connection error from {}: {}", peer, e);
            }
        });
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, ack: bool) -> anyhow::Result<()> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut sink, mut stream) = ws.split();
    tracing::info!("{} connected", peer);

    while let Some(msg) = stream.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!("WebSocket error: {}", e);
                break;
            }
        };

        let received = Received::parse(text.as_str());
        match &received {
            Received::Full(msg) => tracing::info!(
                %peer,
                file = %msg.file_name,
                folder = %msg.folder_name,
                uptime = %msg.uptime,
                time = %msg.time,
                timezone = %msg.timezone,
                "{}",
                msg.status
            ),
            Received::Compact(msg) => tracing::info!(
                %peer,
                file = %msg.file_name,
                folder = %msg.folder_name,
                uptime = %msg.uptime,
                "broadcast"
            ),
            Received::Raw(text) => tracing::info!(%peer, "text: {}", text),
        }

        if ack {
            sink.send(Message::Text(received.ack().into())).await?;
        }
    }

    tracing::info!("{} disconnected", peer);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_classified() {
        let full = r#"{"time":"9:05 AM","timezone":"UTC","fileName":"lib.rs","fileType":"rs","folderName":"amp","uptime":"0m 3s","status":"Editing lib.rs"}"#;
        assert!(matches!(Received::parse(full), Received::Full(_)));
        assert_eq!(Received::parse(full).ack(), "seen lib.rs (0m 3s)");

        let compact = r#"{"uptime":"1m 0s","folderName":"amp","fileName":"","fileType":""}"#;
        assert!(matches!(Received::parse(compact), Received::Compact(_)));

        assert!(matches!(Received::parse("Hello from amp!"), Received::Raw(_)));
    }
}
