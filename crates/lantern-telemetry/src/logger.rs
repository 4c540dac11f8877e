//! Logger construction and the leveled logging facade.
//!
//! A [`Logger`] is built once from immutable configuration: the transport
//! set, minimum severity and label are fixed at construction. Loggers are
//! cheap to clone and safe to share across tasks.
//!
//! # Examples
//!
//! ```rust,no_run
//! use lantern_telemetry::{Environment, Logger, TelemetryConfig};
//!
//! let config = TelemetryConfig::new(Environment::Development);
//! let logger = Logger::new("billing", &config);
//! logger.log("invoice issued", Some("InvoiceService"));
//! logger.warn("retrying charge", None);
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::{Environment, TelemetryConfig};
use crate::entry::LogEntry;
use crate::format;
use crate::level::Level;
use crate::transport::{
    ConsoleTransport, MemoryTransport, NullTransport, RenderMode, Transport, TransportKind,
    select_transports,
};

struct Sink {
    kind: TransportKind,
    transport: Box<dyn Transport>,
}

impl Sink {
    fn for_kind(kind: TransportKind) -> Self {
        let transport: Box<dyn Transport> = match kind {
            TransportKind::Null => Box::new(NullTransport),
            TransportKind::Console(_) => Box::new(ConsoleTransport),
            TransportKind::Memory(_) => Box::new(MemoryTransport::new()),
        };
        Self { kind, transport }
    }
}

struct LoggerInner {
    label: String,
    level: Level,
    colorize: bool,
    config: TelemetryConfig,
    sinks: Vec<Sink>,
}

/// A labelled logger bound to a fixed transport set.
///
/// Every entry runs through the formatting pipeline (metadata injection,
/// error normalization, label attachment) before each transport renders
/// and writes it. Entries below the configured severity are dropped
/// before the pipeline runs.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl Logger {
    /// Build a logger labelled `label` with the transports
    /// [`select_transports`] picks for `config`.
    #[must_use]
    pub fn new(label: &str, config: &TelemetryConfig) -> Self {
        let sinks = select_transports(config)
            .into_iter()
            .map(Sink::for_kind)
            .collect();
        Self::assemble(label, config, sinks)
    }

    /// Build a logger that writes to an in-memory buffer instead of the
    /// console, returning the capture handle alongside it.
    ///
    /// The null sink is still attached. Clustered configurations capture
    /// logstash JSON lines; everything else captures the readable
    /// development format without colour.
    #[must_use]
    pub fn in_memory(label: &str, config: &TelemetryConfig) -> (Self, MemoryTransport) {
        let mode = if config.environment.is_clustered() {
            RenderMode::Logstash
        } else {
            RenderMode::Development
        };
        let capture = MemoryTransport::new();
        let sinks = vec![
            Sink::for_kind(TransportKind::Null),
            Sink {
                kind: TransportKind::Memory(mode),
                transport: Box::new(capture.clone()),
            },
        ];
        (Self::assemble(label, config, sinks), capture)
    }

    fn assemble(label: &str, config: &TelemetryConfig, sinks: Vec<Sink>) -> Self {
        Self {
            inner: Arc::new(LoggerInner {
                label: label.to_owned(),
                level: config.log_level,
                colorize: config.environment.is_development(),
                config: config.clone(),
                sinks,
            }),
        }
    }

    /// The label stamped on every entry this logger emits.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Minimum severity this logger emits.
    #[must_use]
    pub fn level(&self) -> Level {
        self.inner.level
    }

    /// Environment this logger was built for.
    #[must_use]
    pub fn environment(&self) -> Environment {
        self.inner.config.environment
    }

    /// Kinds of the attached transports, in dispatch order.
    #[must_use]
    pub fn transports(&self) -> Vec<TransportKind> {
        self.inner.sinks.iter().map(|sink| sink.kind).collect()
    }

    /// Emit `message` at `level` with explicit extra fields.
    ///
    /// This is the full-control entry point the leveled facade methods
    /// and the HTTP middleware build on. Messages that fail to serialize
    /// degrade to `null` instead of erroring.
    pub fn log_with(&self, level: Level, message: impl Serialize, fields: Map<String, Value>) {
        if !self.inner.level.permits(level) {
            return;
        }
        let message = serde_json::to_value(message).unwrap_or(Value::Null);
        let entry = LogEntry::new(level, message).with_fields(fields);
        let entry = format::run_pipeline(entry, &self.inner.label, &self.inner.config);

        for sink in &self.inner.sinks {
            let line = match sink.kind.render_mode() {
                Some(RenderMode::Development) => {
                    format::render_development(&entry, self.inner.colorize)
                },
                Some(RenderMode::Logstash) => {
                    format::render_logstash(&format::attach_timestamp(entry.clone()))
                },
                None => String::new(),
            };
            sink.transport.emit(level, &line);
        }
    }

    /// Log a routine message at `info` level.
    pub fn log(&self, message: impl Serialize, context: Option<&str>) {
        self.leveled(Level::Info, message, None, context);
    }

    /// Log a failure, optionally with a stack trace string.
    pub fn error(&self, message: impl Serialize, trace: Option<&str>, context: Option<&str>) {
        self.leveled(Level::Error, message, trace, context);
    }

    /// Log a degraded-but-recoverable condition.
    pub fn warn(&self, message: impl Serialize, context: Option<&str>) {
        self.leveled(Level::Warn, message, None, context);
    }

    /// Log diagnostic detail for development.
    pub fn debug(&self, message: impl Serialize, context: Option<&str>) {
        self.leveled(Level::Debug, message, None, context);
    }

    /// Log chatty progress detail.
    pub fn verbose(&self, message: impl Serialize, context: Option<&str>) {
        self.leveled(Level::Verbose, message, None, context);
    }

    fn leveled(
        &self,
        level: Level,
        message: impl Serialize,
        trace: Option<&str>,
        context: Option<&str>,
    ) {
        let mut fields = Map::new();
        if let Some(context) = context {
            fields.insert("context".to_owned(), Value::String(context.to_owned()));
        }
        if let Some(trace) = trace {
            fields.insert("trace".to_owned(), Value::String(trace.to_owned()));
        }
        self.log_with(level, message, fields);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("label", &self.inner.label)
            .field("level", &self.inner.level)
            .field("transports", &self.transports())
            .finish_non_exhaustive()
    }
}
