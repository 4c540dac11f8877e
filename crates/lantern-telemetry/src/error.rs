//! Error types for the telemetry crate.

use thiserror::Error;

/// Errors surfaced while configuring or installing the logging stack.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A configuration value could not be parsed.
    #[error("invalid telemetry configuration: {0}")]
    InvalidConfig(String),

    /// The global tracing subscriber could not be installed.
    #[error("tracing initialization failed: {0}")]
    Init(String),
}

/// Convenience result alias for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
