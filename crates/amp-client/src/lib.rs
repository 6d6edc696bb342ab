//! Connection manager and editor state tracker for amp.
//!
//! A host (an editor extension, or the terminal harness in `amp-host`)
//! implements [`Host`], picks a [`Dialer`] and hands both to
//! [`Session::init`]. From then on it forwards editor notifications and
//! operator commands as [`Input`]s to [`Session::run`].

mod command;
mod config;
mod host;
mod link;
mod session;
mod settings;

pub use command::{Command, OptionChoice};
pub use config::{ClientConfig, ConfigError};
pub use host::{EditorSurface, Host, InputPrompt, Notifier, SettingsStore, StatusBar};
pub use link::{Dialer, Link, LinkEvent, LinkId, Outbound, WsDialer};
pub use session::{ConnectOutcome, Input, Session};
pub use settings::{FileSettings, SettingsError};
