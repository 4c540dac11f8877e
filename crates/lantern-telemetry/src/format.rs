//! The log formatting pipeline.
//!
//! Three always-on stages run in a fixed order: [`inject_metadata`],
//! [`normalize_error`], then [`attach_label`]. Each stage is a pure
//! function from entry to entry, so stages can be tested in isolation and
//! rerun without side effects. The terminal renderers turn a finished
//! entry into the single line a transport writes: human-readable text for
//! development, logstash-style JSON for clustered environments.

use chrono::{SecondsFormat, Utc};
use colored::Colorize;
use serde_json::{Map, Value};

use crate::config::TelemetryConfig;
use crate::context;
use crate::context::REQUEST_ID_KEY;
use crate::entry::LogEntry;
use crate::level::Level;

/// Keys the development renderer already shows in its prefix, excluded
/// from the trailing JSON payload.
const DEVELOPMENT_EXCLUDED: [&str; 7] = [
    "environment",
    "level",
    "label",
    "timestamp",
    "message",
    "meta",
    "splat",
];

/// Serialize a JSON value with object keys in lexicographic order.
///
/// Output is deterministic for equal inputs regardless of how the value
/// was assembled.
#[must_use]
pub fn stable_json(value: &Value) -> String {
    serde_json::to_string(&stable(value)).unwrap_or_else(|_| "null".to_owned())
}

fn stable(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: std::collections::BTreeMap<&String, Value> =
                map.iter().map(|(key, value)| (key, stable(value))).collect();
            let mut out = Map::new();
            for (key, value) in sorted {
                out.insert(key.clone(), value);
            }
            Value::Object(out)
        },
        Value::Array(items) => Value::Array(items.iter().map(stable).collect()),
        other => other.clone(),
    }
}

/// Render a message value for output: strings verbatim, anything else as
/// deterministic JSON.
#[must_use]
pub fn format_message(message: &Value) -> String {
    match message {
        Value::String(text) => text.clone(),
        other => stable_json(other),
    }
}

/// Stamp the entry with the active correlation identifier and the static
/// deployment metadata.
///
/// The identifier comes from the request context; when no scope is
/// active the `requestId` field is absent from the result, even if the
/// caller supplied one. Running the stage twice under the same context
/// yields the same entry.
#[must_use]
pub fn inject_metadata(mut entry: LogEntry, config: &TelemetryConfig) -> LogEntry {
    match context::request_id() {
        Some(id) => {
            entry
                .fields
                .insert(REQUEST_ID_KEY.to_owned(), Value::String(id));
        },
        None => {
            entry.fields.remove(REQUEST_ID_KEY);
        },
    }
    entry.fields.insert(
        "environment".to_owned(),
        Value::String(config.environment.to_string()),
    );
    entry.fields.insert(
        "version".to_owned(),
        Value::String(config.version.clone()),
    );
    entry
}

/// Normalize the `error` field of error-level entries.
///
/// The error object keeps all its fields; `stack` is replaced by the list
/// of its lines, or by `null` when missing or empty, so multi-line stack
/// traces survive JSON transport intact. Entries at other levels, and
/// error fields that are not objects, pass through untouched.
#[must_use]
pub fn normalize_error(mut entry: LogEntry) -> LogEntry {
    if entry.level != Level::Error {
        return entry;
    }
    let Some(Value::Object(error)) = entry.fields.get("error") else {
        return entry;
    };

    let mut normalized = error.clone();
    let stack = match error.get("stack") {
        Some(Value::String(stack)) if !stack.is_empty() => Value::Array(
            stack
                .lines()
                .map(|line| Value::String(line.to_owned()))
                .collect(),
        ),
        _ => Value::Null,
    };
    normalized.insert("stack".to_owned(), stack);
    entry
        .fields
        .insert("error".to_owned(), Value::Object(normalized));
    entry
}

/// Record the emitting logger's label on the entry.
#[must_use]
pub fn attach_label(mut entry: LogEntry, label: &str) -> LogEntry {
    entry
        .fields
        .insert("label".to_owned(), Value::String(label.to_owned()));
    entry
}

/// Attach the current time as an RFC 3339 timestamp with millisecond
/// precision, as the clustered render path expects.
#[must_use]
pub fn attach_timestamp(mut entry: LogEntry) -> LogEntry {
    entry.timestamp = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
    entry
}

/// Run the always-on pipeline stages in their fixed order.
#[must_use]
pub fn run_pipeline(entry: LogEntry, label: &str, config: &TelemetryConfig) -> LogEntry {
    let entry = inject_metadata(entry, config);
    let entry = normalize_error(entry);
    attach_label(entry, label)
}

/// Render the single-line human-readable development format:
/// `[environment] level: [label] message {remaining fields}`.
///
/// With `colorize` the level name is tinted by severity; whether colour
/// codes actually reach the terminal still follows the usual tty
/// detection of the process.
#[must_use]
pub fn render_development(entry: &LogEntry, colorize: bool) -> String {
    let environment = entry
        .fields
        .get("environment")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let label = entry
        .fields
        .get("label")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let mut rest = Map::new();
    for (key, value) in &entry.fields {
        if !DEVELOPMENT_EXCLUDED.contains(&key.as_str()) {
            rest.insert(key.clone(), value.clone());
        }
    }

    let level = if colorize {
        entry.level.as_str().color(entry.level.color()).to_string()
    } else {
        entry.level.as_str().to_owned()
    };

    format!(
        "[{environment}] {level}: [{label}] {} {}",
        format_message(&entry.message),
        stable_json(&Value::Object(rest))
    )
}

/// Render the logstash-style JSON line for clustered environments:
/// `@message`, `@timestamp` and `@fields`.
///
/// `@fields` carries every remaining field, including the level and
/// label; `@message` and `@timestamp` are omitted when absent.
#[must_use]
pub fn render_logstash(entry: &LogEntry) -> String {
    let mut logstash = Map::new();

    let message_present = match &entry.message {
        Value::Null => false,
        Value::String(text) => !text.is_empty(),
        _ => true,
    };
    if message_present {
        logstash.insert(
            "@message".to_owned(),
            Value::String(format_message(&entry.message)),
        );
    }
    if let Some(timestamp) = &entry.timestamp {
        logstash.insert("@timestamp".to_owned(), Value::String(timestamp.clone()));
    }

    let mut fields = entry.fields.clone();
    fields.insert(
        "level".to_owned(),
        Value::String(entry.level.as_str().to_owned()),
    );
    logstash.insert("@fields".to_owned(), Value::Object(fields));

    stable_json(&Value::Object(logstash))
}
