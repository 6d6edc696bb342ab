//! Observed editor context.

use std::path::Path;
use std::time::{Duration, Instant};

/// Folder name reported when no workspace folder is open.
pub const NO_FOLDER: &str = "No folder is currently open";

/// The latest observed editor context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSnapshot {
    pub folder_name: String,
    pub file_name: String,
    pub file_type: String,
    pub session_start: Instant,
}

impl EditorSnapshot {
    /// Empty snapshot for a session started at `session_start`.
    pub fn new(session_start: Instant) -> Self {
        Self {
            folder_name: NO_FOLDER.to_string(),
            file_name: String::new(),
            file_type: String::new(),
            session_start,
        }
    }

    /// Record the active document. `None` means no document is open.
    pub fn set_active_document(&mut self, path: Option<&Path>) {
        match path {
            Some(path) => {
                self.file_name = file_name_of(path);
                self.file_type = file_type_of(&self.file_name);
            }
            None => {
                self.file_name.clear();
                self.file_type.clear();
            }
        }
    }

    /// Record the first workspace folder. `None` means no folder is open.
    pub fn set_workspace_folder(&mut self, folder: Option<&str>) {
        self.folder_name = match folder {
            Some(name) => name.to_string(),
            None => NO_FOLDER.to_string(),
        };
    }

    /// Time elapsed since the session started, as of `now`.
    pub fn uptime_at(&self, now: Instant) -> Uptime {
        Uptime(now.saturating_duration_since(self.session_start))
    }

    pub fn uptime(&self) -> Uptime {
        self.uptime_at(Instant::now())
    }
}

/// Last path segment, lossily converted.
fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Everything after the last `.` of the file name; empty when there is none.
fn file_type_of(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_string())
        .unwrap_or_default()
}

/// Session uptime, displayed as `<minutes>m <seconds>s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Uptime(pub Duration);

impl std::fmt::Display for Uptime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let secs = self.0.as_secs();
        write!(f, "{}m {}s", secs / 60, secs % 60)
    }
}
