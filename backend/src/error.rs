//! Error types for calendar queries and configuration.
//!
//! Provider failures have their own type in [`crate::ephemeris::EphemerisError`];
//! they never reach callers of the calendar surface because every scan check
//! degrades to "no event" on failure.

use std::path::PathBuf;

/// Result type for calendar queries.
pub type CalendarResult<T> = Result<T, CalendarError>;

/// Invalid input to a calendar query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarError {
    /// Month outside 1..=12 or a year chrono cannot represent.
    #[error("Invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    /// Date string that is not `YYYY-MM-DD`, or a date out of range.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Observer coordinates out of range.
    #[error("Invalid observer: {0}")]
    InvalidObserver(String),

    /// Event position requested past the end of a day's event list.
    #[error("Event {index} not found ({count} events on {date})")]
    EventNotFound {
        date: String,
        index: usize,
        count: usize,
    },
}

/// Error raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`crate::config::AppConfig`].
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Environment variable could not be parsed.
    #[error("Environment variable {key} has invalid value '{value}'")]
    InvalidEnv { key: String, value: String },

    /// A value parsed but is out of its allowed range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
