//! Severity levels for log entries.
//!
//! The ladder follows the npm convention: `error` is the most severe,
//! `silly` the least. A logger configured at some level emits entries at
//! that severity and above, so `debug` keeps everything but `silly`.

use std::fmt;
use std::str::FromStr;

use colored::Color;
use serde::{Deserialize, Serialize};

use crate::error::TelemetryError;

/// Severity of a log entry, declared from most to least severe.
///
/// The derived ordering follows declaration order, so a smaller level is a
/// more severe one: `Level::Error < Level::Silly`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Unrecoverable failures.
    Error,
    /// Degraded but recoverable conditions.
    Warn,
    /// Routine operational messages.
    Info,
    /// One entry per handled HTTP request.
    Http,
    /// Chatty progress detail.
    Verbose,
    /// Diagnostic output for development.
    Debug,
    /// Everything, including trace-grade noise.
    Silly,
}

impl Level {
    /// Every level, ordered from most to least severe.
    pub const ALL: [Level; 7] = [
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Http,
        Level::Verbose,
        Level::Debug,
        Level::Silly,
    ];

    /// Numeric rank in the npm ladder (`error` is 0, `silly` is 6).
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Level::Error => 0,
            Level::Warn => 1,
            Level::Info => 2,
            Level::Http => 3,
            Level::Verbose => 4,
            Level::Debug => 5,
            Level::Silly => 6,
        }
    }

    /// Lowercase name as it appears on rendered entries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Http => "http",
            Level::Verbose => "verbose",
            Level::Debug => "debug",
            Level::Silly => "silly",
        }
    }

    /// Whether a logger configured at `self` emits entries at `entry` level.
    #[must_use]
    pub fn permits(self, entry: Level) -> bool {
        entry <= self
    }

    /// Terminal colour used by the development renderer.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Level::Error => Color::Red,
            Level::Warn => Color::Yellow,
            Level::Info | Level::Http => Color::Green,
            Level::Verbose => Color::Cyan,
            Level::Debug => Color::Blue,
            Level::Silly => Color::Magenta,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Level::Error),
            "warn" => Ok(Level::Warn),
            "info" => Ok(Level::Info),
            "http" => Ok(Level::Http),
            "verbose" => Ok(Level::Verbose),
            "debug" => Ok(Level::Debug),
            "silly" => Ok(Level::Silly),
            other => Err(TelemetryError::InvalidConfig(format!(
                "unknown log level: {other}"
            ))),
        }
    }
}
