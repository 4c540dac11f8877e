//! Bridge from the `tracing` ecosystem into a [`Logger`].
//!
//! Libraries in the dependency tree emit `tracing` events; installing the
//! bridge routes those through the same pipeline as direct logger calls,
//! so they pick up the request correlation identifier, the label and the
//! environment-appropriate renderer.
//!
//! # Examples
//!
//! ```rust,no_run
//! use lantern_telemetry::{Logger, TelemetryConfig, init_tracing};
//!
//! # fn main() -> lantern_telemetry::TelemetryResult<()> {
//! let config = TelemetryConfig::from_env()?;
//! init_tracing(Logger::new("app", &config))?;
//! tracing::info!("now flowing through the logger");
//! # Ok(())
//! # }
//! ```

use std::fmt;

use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::{TelemetryError, TelemetryResult};
use crate::level::Level;
use crate::logger::Logger;

/// `tracing-subscriber` layer that forwards events to a [`Logger`].
///
/// The event's target becomes the entry's `context` field unless the
/// event carries an explicit `context` field of its own.
pub struct TracingBridge {
    logger: Logger,
}

impl TracingBridge {
    /// Bridge forwarding to `logger`.
    #[must_use]
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for TracingBridge
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let message = visitor.message.unwrap_or(Value::Null);
        let mut fields = visitor.fields;
        fields
            .entry("context")
            .or_insert_with(|| Value::String(event.metadata().target().to_owned()));

        self.logger
            .log_with(map_level(event.metadata().level()), message, fields);
    }
}

/// Install a bridge to `logger` as the global tracing subscriber.
///
/// # Errors
///
/// Returns [`TelemetryError::Init`] when a global subscriber is already
/// installed.
pub fn init_tracing(logger: Logger) -> TelemetryResult<()> {
    tracing_subscriber::registry()
        .with(TracingBridge::new(logger))
        .try_init()
        .map_err(|error| TelemetryError::Init(error.to_string()))
}

fn map_level(level: &tracing::Level) -> Level {
    if *level == tracing::Level::ERROR {
        Level::Error
    } else if *level == tracing::Level::WARN {
        Level::Warn
    } else if *level == tracing::Level::INFO {
        Level::Info
    } else if *level == tracing::Level::DEBUG {
        Level::Debug
    } else {
        Level::Silly
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<Value>,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn record(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.fields.insert(field.name().to_owned(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record(field, Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field, Value::String(value.to_owned()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record(field, Value::from(value));
    }
}
