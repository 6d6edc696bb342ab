//! Listener endpoint.
//!
//! An endpoint is the URI the broadcaster dials, typically `ws://host:port`.
//! The only validation is that it is non-empty once surrounding whitespace is
//! trimmed; the transport reports anything else as a connection error.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A non-empty listener URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoint {
    uri: String,
}

impl Endpoint {
    /// Parse an endpoint, rejecting empty input.
    pub fn parse(s: &str) -> Result<Self, EndpointParseError> {
        s.parse()
    }

    /// Parse an optional stored value. `None` and empty strings both mean
    /// "not configured".
    pub fn from_setting(value: Option<&str>) -> Option<Self> {
        value.and_then(|v| v.parse().ok())
    }

    /// The URI as given (trimmed).
    pub fn as_str(&self) -> &str {
        &self.uri
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl FromStr for Endpoint {
    type Err = EndpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uri = s.trim();
        if uri.is_empty() {
            return Err(EndpointParseError::Empty);
        }
        Ok(Self {
            uri: uri.to_string(),
        })
    }
}

impl TryFrom<String> for Endpoint {
    type Error = EndpointParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.uri
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

/// Error parsing an endpoint string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointParseError {
    #[error("WebSocket URL is not set")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        let ep: Endpoint = "  ws://localhost:8080 \n".parse().unwrap();
        assert_eq!(ep.as_str(), "ws://localhost:8080");
    }

    #[test]
    fn empty_is_rejected() {
        assert_eq!(Endpoint::parse(""), Err(EndpointParseError::Empty));
        assert_eq!(Endpoint::parse("   "), Err(EndpointParseError::Empty));
    }

    #[test]
    fn from_setting_treats_blank_as_unset() {
        assert_eq!(Endpoint::from_setting(None), None);
        assert_eq!(Endpoint::from_setting(Some("")), None);
        assert_eq!(Endpoint::from_setting(Some(" \t")), None);
        let ep = Endpoint::from_setting(Some(" wss://example.com/feed ")).unwrap();
        assert_eq!(ep.as_str(), "wss://example.com/feed");
    }

    #[test]
    fn serde_rejects_empty() {
        let ok: Endpoint = serde_json::from_str("\"ws://a\"").unwrap();
        assert_eq!(ok.to_string(), "ws://a");
        assert!(serde_json::from_str::<Endpoint>("\"\"").is_err());
    }
}
