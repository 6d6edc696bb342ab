//! Capabilities the session needs from the hosting editor.
//!
//! The session never draws UI or watches files itself. Everything it needs
//! from the outside world goes through these traits; a host implements all of
//! them and gets [`Host`] for free.

use crate::settings::SettingsError;
use amp_core::{Endpoint, Notice};
use std::future::Future;
use std::path::PathBuf;

/// Toast-style notifications.
pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

/// The single-line status readout.
pub trait StatusBar {
    fn set_status(&mut self, text: &str);
}

/// Operator input.
pub trait InputPrompt {
    /// Ask for free text. `None` when the operator cancels.
    fn prompt(
        &mut self,
        message: &str,
        placeholder: &str,
    ) -> impl Future<Output = Option<String>> + Send;

    /// Ask the operator to pick one of `options`. Returns the index picked.
    fn choose(
        &mut self,
        title: &str,
        options: &[&'static str],
    ) -> impl Future<Output = Option<usize>> + Send;
}

/// Per-workspace persisted settings.
pub trait SettingsStore {
    fn endpoint(&self) -> Option<String>;
    fn set_endpoint(&mut self, endpoint: &Endpoint) -> Result<(), SettingsError>;
}

/// Read access to the editor's current document and workspace.
pub trait EditorSurface {
    fn active_document(&self) -> Option<PathBuf>;
    fn workspace_folder(&self) -> Option<String>;
}

/// Everything a session needs from its host.
pub trait Host: Notifier + StatusBar + InputPrompt + SettingsStore + EditorSurface {}

impl<T> Host for T where T: Notifier + StatusBar + InputPrompt + SettingsStore + EditorSurface {}
