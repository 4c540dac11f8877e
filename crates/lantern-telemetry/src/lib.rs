//! Lantern Telemetry - Request-correlated structured logging for web-service backends.
//!
//! This crate provides:
//! - A per-request context store that follows asynchronous control flow
//! - A pure formatting pipeline with environment-selected renderers
//! - Labelled loggers with npm-style severity levels
//! - A bridge routing `tracing` events through the same pipeline
//!
//! # Example
//!
//! ```rust,no_run
//! use lantern_telemetry::{Logger, TelemetryConfig, init_tracing};
//!
//! # fn main() -> Result<(), lantern_telemetry::TelemetryError> {
//! // Read ENVIRONMENT, LOG_LEVEL and VERSION
//! let config = TelemetryConfig::from_env()?;
//!
//! // One labelled logger per subsystem
//! let logger = Logger::new("orders", &config);
//! logger.log("service starting", None);
//!
//! // Dependency `tracing` events flow through the same pipeline
//! init_tracing(logger.clone())?;
//! tracing::info!("routed and correlated");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod context;
pub mod prelude;

mod bridge;
mod config;
mod entry;
mod error;
mod format;
mod level;
mod logger;
mod transport;

pub use bridge::{TracingBridge, init_tracing};
pub use config::{ENV_ENVIRONMENT, ENV_LOG_LEVEL, ENV_VERSION, Environment, TelemetryConfig};
pub use entry::LogEntry;
pub use error::{TelemetryError, TelemetryResult};
pub use format::{
    attach_label, attach_timestamp, format_message, inject_metadata, normalize_error,
    render_development, render_logstash, run_pipeline, stable_json,
};
pub use level::Level;
pub use logger::Logger;
pub use transport::{
    ConsoleTransport, MemoryTransport, NullTransport, RenderMode, Transport, TransportKind,
    select_transports,
};
