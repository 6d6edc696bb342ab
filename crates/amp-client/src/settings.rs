//! Per-workspace settings file.
//!
//! Stored as TOML at `<workspace>/.amp/settings.toml`. Only the endpoint is
//! persisted.

use crate::host::SettingsStore;
use amp_core::Endpoint;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const SETTINGS_DIR: &str = ".amp";
const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    websocket_url: Option<String>,
}

/// Settings persisted in a workspace directory.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    settings: Settings,
}

impl FileSettings {
    /// Open the settings for `workspace`. A missing file is an empty store.
    pub fn open(workspace: &Path) -> Result<Self, SettingsError> {
        let path = workspace.join(SETTINGS_DIR).join(SETTINGS_FILE);
        let settings = match std::fs::read_to_string(&path) {
            Ok(s) => toml::from_str(&s)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Settings::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, settings })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), SettingsError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let s = toml::to_string(&self.settings)?;
        std::fs::write(&self.path, s)?;
        Ok(())
    }
}

impl SettingsStore for FileSettings {
    fn endpoint(&self) -> Option<String> {
        self.settings.websocket_url.clone()
    }

    fn set_endpoint(&mut self, endpoint: &Endpoint) -> Result<(), SettingsError> {
        let previous = self
            .settings
            .websocket_url
            .replace(endpoint.to_string());
        if let Err(e) = self.save() {
            self.settings.websocket_url = previous;
            return Err(e);
        }
        tracing::debug!(path = %self.path.display(), %endpoint, "endpoint saved");
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings file is invalid: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to encode settings: {0}")]
    Encode(#[from] toml::ser::Error),
}
