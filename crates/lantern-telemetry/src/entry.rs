//! The structured log entry passed through the formatting pipeline.

use serde_json::{Map, Value};

use crate::level::Level;

/// A single structured log entry.
///
/// Pipeline stages consume an entry and return a new one; nothing mutates
/// an entry in place once it has been handed to a transport. Extra fields
/// live in a [`Map`] keyed by field name, which iterates in lexicographic
/// order and keeps rendered output deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Severity of the entry.
    pub level: Level,
    /// The message: a plain string, or any structured value the terminal
    /// renderer serializes deterministically.
    pub message: Value,
    /// RFC 3339 timestamp attached by the clustered render path.
    pub timestamp: Option<String>,
    /// All remaining fields of the entry.
    pub fields: Map<String, Value>,
}

impl LogEntry {
    /// Entry with no extra fields and no timestamp.
    #[must_use]
    pub fn new(level: Level, message: impl Into<Value>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: None,
            fields: Map::new(),
        }
    }

    /// Attach one extra field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Attach several extra fields at once.
    #[must_use]
    pub fn with_fields(mut self, fields: Map<String, Value>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Look up an extra field by name.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}
