//! Wire payloads.
//!
//! Each broadcast is one JSON object sent as a single text frame. The full
//! payload is the default; the compact form carries only the snapshot fields
//! and uptime, for listeners that predate the richer format.

use crate::snapshot::EditorSnapshot;
use chrono::{DateTime, Local, TimeZone};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Instant;

/// Built-in activity caption phrases.
pub const DEFAULT_CAPTIONS: &[&str] = &[
    "Working on",
    "Editing",
    "Hacking away at",
    "Debugging",
    "Refactoring",
    "Polishing",
    "Staring intently at",
];

/// Fallback when the system timezone cannot be determined.
const FALLBACK_TIMEZONE: &str = "UTC";

/// Full broadcast payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastMessage {
    /// Local wall clock, `H:MM AM/PM`.
    pub time: String,
    /// IANA zone name.
    pub timezone: String,
    pub file_name: String,
    pub file_type: String,
    pub folder_name: String,
    /// `<minutes>m <seconds>s`.
    pub uptime: String,
    /// `<caption> <fileName>`.
    pub status: String,
}

/// Compact broadcast payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactMessage {
    pub uptime: String,
    pub folder_name: String,
    pub file_name: String,
    pub file_type: String,
}

/// Which payload shape goes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFormat {
    #[default]
    Full,
    Compact,
}

/// The phrase set activity captions are drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Captions(Vec<String>);

impl Default for Captions {
    fn default() -> Self {
        Self(DEFAULT_CAPTIONS.iter().map(|s| s.to_string()).collect())
    }
}

impl Captions {
    /// Custom phrase set. An empty list falls back to the defaults.
    pub fn new(phrases: Vec<String>) -> Self {
        if phrases.is_empty() {
            Self::default()
        } else {
            Self(phrases)
        }
    }

    /// Pick a phrase uniformly at random.
    pub fn pick(&self) -> &str {
        self.0
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(DEFAULT_CAPTIONS[0])
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.0.iter().any(|p| p == phrase)
    }

    pub fn phrases(&self) -> &[String] {
        &self.0
    }
}

impl BroadcastMessage {
    /// Build a payload from explicit inputs.
    pub fn build<Tz>(
        snapshot: &EditorSnapshot,
        now: Instant,
        clock: &DateTime<Tz>,
        timezone: impl Into<String>,
        caption: &str,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            time: format_clock(clock),
            timezone: timezone.into(),
            file_name: snapshot.file_name.clone(),
            file_type: snapshot.file_type.clone(),
            folder_name: snapshot.folder_name.clone(),
            uptime: snapshot.uptime_at(now).to_string(),
            status: format!("{caption} {}", snapshot.file_name),
        }
    }

    /// Build a payload for right now, using the local clock and a random
    /// caption.
    pub fn capture(snapshot: &EditorSnapshot, captions: &Captions) -> Self {
        Self::build(
            snapshot,
            Instant::now(),
            &Local::now(),
            local_timezone(),
            captions.pick(),
        )
    }

    /// The caption part of `status`, if `status` ends with this payload's
    /// file name.
    pub fn caption(&self) -> Option<&str> {
        self.status
            .strip_suffix(self.file_name.as_str())
            .and_then(|rest| rest.strip_suffix(' '))
    }

    pub fn compact(&self) -> CompactMessage {
        CompactMessage {
            uptime: self.uptime.clone(),
            folder_name: self.folder_name.clone(),
            file_name: self.file_name.clone(),
            file_type: self.file_type.clone(),
        }
    }

    /// Serialize in the requested shape.
    pub fn encode(&self, format: PayloadFormat) -> serde_json::Result<String> {
        match format {
            PayloadFormat::Full => serde_json::to_string(self),
            PayloadFormat::Compact => serde_json::to_string(&self.compact()),
        }
    }
}

/// Format a wall-clock time as `H:MM AM/PM` (hour not zero-padded).
pub fn format_clock<Tz>(t: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    t.format("%-I:%M %p").to_string()
}

/// IANA name of the system timezone.
pub fn local_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| FALLBACK_TIMEZONE.to_string())
}
