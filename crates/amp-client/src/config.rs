//! Client configuration.
//!
//! Loaded from TOML; every key is optional.
//!
//! ```toml
//! status_refresh_ms = 1000
//! payload = "full"        # or "compact"
//! connect_on_start = true
//! captions = ["Editing", "Debugging"]
//! ```

use amp_core::{Captions, PayloadFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Period of the status-label refresh timer.
    pub status_refresh_ms: u64,
    /// Wire shape of each broadcast.
    pub payload: PayloadFormat,
    /// Connect to the stored endpoint during `init`.
    pub connect_on_start: bool,
    /// Activity caption phrases.
    pub captions: Captions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            status_refresh_ms: 1000,
            payload: PayloadFormat::Full,
            connect_on_start: true,
            captions: Captions::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(s)?;
        config.captions = Captions::new(config.captions.phrases().to_vec());
        Ok(config)
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(s) => Self::from_toml_str(&s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn status_refresh(&self) -> Duration {
        Duration::from_millis(self.status_refresh_ms.max(1))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
