//! Outbound WebSocket links.
//!
//! A link is one connection attempt. Its task owns the socket; the session
//! talks to it through an unbounded queue and hears back through
//! [`LinkEvent`]s, so nothing the session does ever waits on the network.

use amp_core::{ConnectionEvent, Endpoint};
use futures_util::{SinkExt, StreamExt};
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

/// How long teardown waits for a link to finish its close handshake.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Identifies one connection attempt. Events from older attempts are
/// discarded by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub u64);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link#{}", self.0)
    }
}

/// An edge reported by a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEvent {
    pub link: LinkId,
    pub event: ConnectionEvent,
}

/// Requests from the session to a link task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// One text frame.
    Text(String),
    /// Send a close frame and stop.
    Close,
}

/// Session-side handle to a connection attempt.
#[derive(Debug)]
pub struct Link {
    id: LinkId,
    outbound: mpsc::UnboundedSender<Outbound>,
    task: Option<JoinHandle<()>>,
}

impl Link {
    pub fn new(
        id: LinkId,
        outbound: mpsc::UnboundedSender<Outbound>,
        task: Option<JoinHandle<()>>,
    ) -> Self {
        Self { id, outbound, task }
    }

    pub fn id(&self) -> LinkId {
        self.id
    }

    /// Queue a text frame. Returns false if the link task is gone.
    pub fn send_text(&self, text: String) -> bool {
        self.outbound.send(Outbound::Text(text)).is_ok()
    }

    /// Ask the link to close and wait (bounded) for its task to finish.
    pub async fn close(mut self) {
        let _ = self.outbound.send(Outbound::Close);
        if let Some(mut task) = self.task.take()
            && tokio::time::timeout(CLOSE_TIMEOUT, &mut task).await.is_err()
        {
            tracing::warn!(link = %self.id, "close handshake timed out, aborting");
            task.abort();
        }
    }
}

/// Opens links.
pub trait Dialer {
    /// Start connecting to `endpoint`. Edges are reported on `events` tagged
    /// with `id`. Must not block.
    fn dial(
        &mut self,
        id: LinkId,
        endpoint: &Endpoint,
        events: mpsc::UnboundedSender<LinkEvent>,
    ) -> Link;
}

/// Dials real WebSocket listeners with tokio-tungstenite.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsDialer;

impl Dialer for WsDialer {
    fn dial(
        &mut self,
        id: LinkId,
        endpoint: &Endpoint,
        events: mpsc::UnboundedSender<LinkEvent>,
    ) -> Link {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let uri = endpoint.to_string();
        let task = tokio::spawn(run_link(id, uri, outbound_rx, events));
        Link::new(id, outbound_tx, Some(task))
    }
}

async fn run_link(
    id: LinkId,
    uri: String,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<LinkEvent>,
) {
    let emit = |event: ConnectionEvent| {
        let _ = events.send(LinkEvent { link: id, event });
    };

    tracing::debug!(link = %id, %uri, "dialing");

    let connect = tokio_tungstenite::connect_async(uri.as_str());
    tokio::pin!(connect);

    let ws = loop {
        tokio::select! {
            res = &mut connect => match res {
                Ok((ws, _response)) => break ws,
                Err(e) => {
                    tracing::debug!(link = %id, "connect failed: {}", e);
                    emit(ConnectionEvent::Errored(e.to_string()));
                    return;
                }
            },
            cmd = outbound.recv() => match cmd {
                Some(Outbound::Text(_)) => {
                    tracing::debug!(link = %id, "dropping frame queued before handshake");
                }
                Some(Outbound::Close) | None => {
                    emit(ConnectionEvent::Closed);
                    return;
                }
            },
        }
    };

    emit(ConnectionEvent::Opened);
    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            cmd = outbound.recv() => match cmd {
                Some(Outbound::Text(text)) => {
                    if let Err(e) = sink.send(Message::Text(text.into())).await {
                        emit(ConnectionEvent::Errored(e.to_string()));
                        return;
                    }
                }
                Some(Outbound::Close) | None => {
                    if let Err(e) = sink.close().await {
                        tracing::debug!(link = %id, "close frame not delivered: {}", e);
                    }
                    emit(ConnectionEvent::Closed);
                    return;
                }
            },
            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    emit(ConnectionEvent::Message(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(data))) => {
                    emit(ConnectionEvent::Message(String::from_utf8_lossy(&data).into_owned()));
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(link = %id, ?frame, "peer closed");
                    emit(ConnectionEvent::Closed);
                    return;
                }
                // Pings are answered by tungstenite itself.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    emit(ConnectionEvent::Errored(e.to_string()));
                    return;
                }
                None => {
                    emit(ConnectionEvent::Closed);
                    return;
                }
            },
        }
    }
}
