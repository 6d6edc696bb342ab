//! Core types for amp.
//!
//! amp broadcasts the editor's live context (active file, folder, session
//! uptime) to a listener over one WebSocket connection. This crate holds the
//! pieces that do no I/O: the endpoint type, the connection state machine,
//! the editor snapshot and the wire payloads. `amp-client` drives them.

mod endpoint;
mod error;
mod message;
mod snapshot;
mod state;

pub use endpoint::{Endpoint, EndpointParseError};
pub use error::{Error, Result};
pub use message::{
    BroadcastMessage, Captions, CompactMessage, DEFAULT_CAPTIONS, PayloadFormat, format_clock,
    local_timezone,
};
pub use snapshot::{EditorSnapshot, NO_FOLDER, Uptime};
pub use state::{
    ConnectionEvent, ConnectionState, Effect, LABEL_CONNECTED, LABEL_CONNECTING,
    LABEL_DISCONNECTED, Level, Notice, Transition, transition,
};
