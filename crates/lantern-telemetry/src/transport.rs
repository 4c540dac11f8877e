//! Emission targets for rendered log lines.
//!
//! Transport selection is a pure function of the configuration, separate
//! from construction, so the routing rules can be tested without touching
//! stdout. Every logger carries the null sink; console output is added
//! only where the environment calls for it.

use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::config::TelemetryConfig;
use crate::level::Level;

/// Levels the console transport routes to stderr instead of stdout.
const STDERR_LEVELS: [Level; 1] = [Level::Error];

/// A destination for fully rendered log lines.
///
/// Implementations must not panic: a failing sink degrades to dropping
/// lines rather than taking the service down with it.
pub trait Transport: Send + Sync {
    /// Write one rendered line at the given severity.
    fn emit(&self, level: Level, line: &str);
}

/// Terminal renderer attached to a console-bound transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Human-readable single-line text.
    Development,
    /// Logstash-style line-delimited JSON.
    Logstash,
}

/// Transport descriptor, as produced by [`select_transports`] and
/// reported by a logger's introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Discards everything; guarantees the logger always has at least one
    /// valid destination.
    Null,
    /// Writes to the process console with the given renderer.
    Console(RenderMode),
    /// Captures lines in memory with the given renderer (test support).
    Memory(RenderMode),
}

impl TransportKind {
    /// The renderer this transport expects, if it renders at all.
    #[must_use]
    pub const fn render_mode(self) -> Option<RenderMode> {
        match self {
            TransportKind::Null => None,
            TransportKind::Console(mode) | TransportKind::Memory(mode) => Some(mode),
        }
    }
}

/// Decide which transports a logger gets for `config`.
///
/// The null sink always comes first. Development adds a human-readable
/// console; clustered environments add a logstash JSON console; every
/// other environment stays console-silent.
#[must_use]
pub fn select_transports(config: &TelemetryConfig) -> Vec<TransportKind> {
    let mut kinds = vec![TransportKind::Null];
    if config.environment.is_development() {
        kinds.push(TransportKind::Console(RenderMode::Development));
    } else if config.environment.is_clustered() {
        kinds.push(TransportKind::Console(RenderMode::Logstash));
    }
    kinds
}

/// Transport that drops every line.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn emit(&self, _level: Level, _line: &str) {}
}

/// Console transport: stdout for regular lines, stderr for error-level
/// ones. Write failures are swallowed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleTransport;

impl Transport for ConsoleTransport {
    fn emit(&self, level: Level, line: &str) {
        if STDERR_LEVELS.contains(&level) {
            let _ = writeln!(std::io::stderr().lock(), "{line}");
        } else {
            let _ = writeln!(std::io::stdout().lock(), "{line}");
        }
    }
}

/// Transport that captures rendered lines for later inspection.
///
/// Clones share the same buffer; keep one handle and hand the other to a
/// logger to observe what it emits.
#[derive(Debug, Default, Clone)]
pub struct MemoryTransport {
    lines: Arc<Mutex<Vec<(Level, String)>>>,
}

impl MemoryTransport {
    /// Empty capture buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured lines in emission order.
    #[must_use]
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Whether nothing has been captured yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }
}

impl Transport for MemoryTransport {
    fn emit(&self, level: Level, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, line.to_owned()));
        }
    }
}
