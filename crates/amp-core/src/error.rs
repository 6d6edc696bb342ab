//! Error taxonomy.

use crate::endpoint::EndpointParseError;

/// Errors surfaced to the operator.
///
/// None of these are fatal: the session stays loaded and every retry is
/// operator-initiated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No usable endpoint configured.
    #[error("{0}")]
    Configuration(#[from] EndpointParseError),
    /// Transport-level failure (refused, reset, protocol error).
    #[error("WebSocket error: {0}")]
    Connection(String),
    /// An operation needed an open connection.
    #[error("Not connected to WebSocket server")]
    NotConnected,
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_notifications() {
        assert_eq!(
            Error::from(EndpointParseError::Empty).to_string(),
            "WebSocket URL is not set"
        );
        assert_eq!(
            Error::Connection("connection refused".into()).to_string(),
            "WebSocket error: connection refused"
        );
    }
}
