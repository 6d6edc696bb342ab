//! End-to-end tests against a real WebSocket listener on localhost.

mod common;

use amp_client::{ClientConfig, Session, WsDialer};
use amp_core::{BroadcastMessage, ConnectionState, Level};
use common::FakeHost;
use futures_util::{SinkExt, StreamExt};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

const STEP: Duration = Duration::from_secs(5);

/// What the listener saw.
#[derive(Debug)]
enum Seen {
    Text(String),
    Closed,
}

/// Accept one connection, reply "ack" to the first text frame and report
/// everything received.
async fn spawn_listener() -> (String, mpsc::UnboundedReceiver<Seen>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let (mut sink, mut stream) = ws.split();
        let mut acked = false;
        while let Some(msg) = stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    let _ = tx.send(Seen::Text(text.as_str().to_owned()));
                    if !acked {
                        acked = true;
                        let _ = sink.send(Message::Text("ack".into())).await;
                    }
                }
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }
        let _ = tx.send(Seen::Closed);
    });

    (format!("ws://{addr}"), rx)
}

async fn pump_until<F>(session: &mut Session<FakeHost, WsDialer>, mut done: F)
where
    F: FnMut(&Session<FakeHost, WsDialer>) -> bool,
{
    tokio::time::timeout(STEP, async {
        while !done(&*session) {
            session.next_link_event().await;
        }
    })
    .await
    .expect("session did not reach the expected state in time");
}

#[tokio::test]
async fn broadcasts_reach_a_real_listener() {
    let (url, mut seen) = spawn_listener().await;
    let host = FakeHost::with_endpoint(&url);
    host.state().document = Some(PathBuf::from("/src/amp/lib.rs"));
    host.state().folder = Some("amp".into());

    let mut session = Session::new(
        host.clone(),
        WsDialer,
        ClientConfig::default(),
        Instant::now(),
    );
    session.connect().await;
    pump_until(&mut session, |s| s.state() == ConnectionState::Open).await;
    assert!(host.saw(Level::Info, "Connected to WebSocket server"));

    // The snapshot is sent as soon as the link opens.
    let Some(Seen::Text(first)) = tokio::time::timeout(STEP, seen.recv()).await.unwrap() else {
        panic!("expected a broadcast");
    };
    let msg: BroadcastMessage = serde_json::from_str(&first).unwrap();
    assert_eq!(msg.file_name, "lib.rs");
    assert_eq!(msg.file_type, "rs");
    assert_eq!(msg.folder_name, "amp");

    pump_until(&mut session, |_| {
        host.saw(Level::Info, "Message from server: ack")
    })
    .await;

    host.state().document = Some(PathBuf::from("/src/amp/main.rs"));
    session.on_active_document_changed();
    let Some(Seen::Text(second)) = tokio::time::timeout(STEP, seen.recv()).await.unwrap() else {
        panic!("expected a second broadcast");
    };
    let msg: BroadcastMessage = serde_json::from_str(&second).unwrap();
    assert_eq!(msg.file_name, "main.rs");

    session.teardown().await;
    let closed = tokio::time::timeout(STEP, seen.recv()).await.unwrap();
    assert!(matches!(closed, Some(Seen::Closed)));
}

#[tokio::test]
async fn refused_connection_returns_to_disconnected() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let host = FakeHost::with_endpoint(&format!("ws://{addr}"));
    let mut session = Session::new(
        host.clone(),
        WsDialer,
        ClientConfig::default(),
        Instant::now(),
    );
    session.connect().await;
    assert_eq!(session.state(), ConnectionState::Connecting);

    pump_until(&mut session, |s| s.state() == ConnectionState::Disconnected).await;
    let errors = host.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("WebSocket error: "), "{errors:?}");

    // The operator can retry; a fresh link is dialed.
    session.connect().await;
    assert_eq!(session.state(), ConnectionState::Connecting);
    session.teardown().await;
}

#[tokio::test]
async fn listener_going_away_is_reported_as_disconnect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        // Wait for the opening broadcast, then hang up.
        let _ = ws.next().await;
        let _ = ws.close(None).await;
    });

    let host = FakeHost::with_endpoint(&format!("ws://{addr}"));
    let mut session = Session::new(
        host.clone(),
        WsDialer,
        ClientConfig::default(),
        Instant::now(),
    );
    session.connect().await;
    pump_until(&mut session, |s| s.state() == ConnectionState::Open).await;
    pump_until(&mut session, |s| s.state() == ConnectionState::Disconnected).await;

    assert!(host.saw(Level::Info, "Disconnected from WebSocket server"));
    session.teardown().await;
}
