//! Connection lifecycle state machine.
//!
//! The machine is a pure function from `(state, event)` to the next state and
//! a list of effects. The session owning the actual socket interprets the
//! effects; nothing here touches I/O.

use crate::error::Error;

/// Status label shown while no connection is open.
pub const LABEL_DISCONNECTED: &str = "$(debug-disconnect) Disconnected";
/// Status label shown while the handshake is in flight.
pub const LABEL_CONNECTING: &str = "$(sync~spin) Connecting…";
/// Status label shown while the connection is open.
pub const LABEL_CONNECTED: &str = "$(plug) Connected";

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No connection; ready to dial.
    #[default]
    Disconnected,
    /// Dialing, handshake not yet complete.
    Connecting,
    /// Handshake complete; broadcasts are sent.
    Open,
    /// Previous connection finished. Behaves exactly like `Disconnected`.
    Closed,
}

impl ConnectionState {
    /// Whether a connection object is live (dialing or open).
    pub fn is_active(self) -> bool {
        matches!(self, Self::Connecting | Self::Open)
    }

    pub fn is_open(self) -> bool {
        self == Self::Open
    }

    /// Text for the single-line status readout.
    pub fn label(self) -> &'static str {
        match self {
            Self::Disconnected | Self::Closed => LABEL_DISCONNECTED,
            Self::Connecting => LABEL_CONNECTING,
            Self::Open => LABEL_CONNECTED,
        }
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Operator (or startup) asked for a connection.
    ConnectRequested,
    /// Handshake succeeded.
    Opened,
    /// Text received from the listener.
    Message(String),
    /// Peer closed the connection, or the link ended cleanly.
    Closed,
    /// Transport failure.
    Errored(String),
}

/// Severity of an operator notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            text: text.into(),
        }
    }
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open a new connection to the configured endpoint.
    Dial,
    /// Re-render the status label from the new state.
    RefreshStatus,
    /// Show a notification.
    Notify(Notice),
    /// Send the current snapshot.
    Broadcast,
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: ConnectionState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn stay(state: ConnectionState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    fn to(state: ConnectionState, effects: Vec<Effect>) -> Self {
        Self { state, effects }
    }

    /// Whether this transition asks for a new connection.
    pub fn dials(&self) -> bool {
        self.effects.contains(&Effect::Dial)
    }
}

/// Apply `event` to `state`.
///
/// `Open` is reachable only from `Connecting`, and `Dial` is only emitted
/// when no connection is active.
pub fn transition(state: ConnectionState, event: ConnectionEvent) -> Transition {
    use ConnectionState::*;

    let state = if state == Closed { Disconnected } else { state };
    match (state, event) {
        (Connecting | Open, ConnectionEvent::ConnectRequested) => Transition::to(
            state,
            vec![Effect::Notify(Notice::info(
                "Already connected to WebSocket server",
            ))],
        ),
        (_, ConnectionEvent::ConnectRequested) => {
            Transition::to(Connecting, vec![Effect::Dial, Effect::RefreshStatus])
        }

        (Connecting, ConnectionEvent::Opened) => Transition::to(
            Open,
            vec![
                Effect::RefreshStatus,
                Effect::Notify(Notice::info("Connected to WebSocket server")),
                Effect::Broadcast,
            ],
        ),
        // Late handshake from a link we no longer track.
        (_, ConnectionEvent::Opened) => Transition::stay(state),

        (Open, ConnectionEvent::Message(text)) => Transition::to(
            Open,
            vec![Effect::Notify(Notice::info(format!(
                "Message from server: {text}"
            )))],
        ),
        (_, ConnectionEvent::Message(_)) => Transition::stay(state),

        (Connecting | Open, ConnectionEvent::Closed) => Transition::to(
            Disconnected,
            vec![
                Effect::RefreshStatus,
                Effect::Notify(Notice::info("Disconnected from WebSocket server")),
            ],
        ),
        (Connecting | Open, ConnectionEvent::Errored(description)) => Transition::to(
            Disconnected,
            vec![
                Effect::RefreshStatus,
                Effect::Notify(Notice::error(Error::Connection(description).to_string())),
            ],
        ),
        (_, ConnectionEvent::Closed | ConnectionEvent::Errored(_)) => Transition::stay(state),
    }
}
