//! Lantern HTTP - Correlation and request-logging middleware for axum services.
//!
//! This crate provides:
//! - Middleware opening a per-request context scope
//! - Middleware assigning a UUID v4 correlation identifier
//! - A request logger emitting one `http`-level entry per request
//! - Sanitizers that keep credentials out of logged metadata
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::{Router, middleware, routing::get};
//! use lantern_http::{RequestLogging, assign_request_id, open_context};
//! use lantern_telemetry::{Logger, TelemetryConfig};
//!
//! # fn main() -> Result<(), lantern_telemetry::TelemetryError> {
//! let config = TelemetryConfig::from_env()?;
//! let logger = Logger::new("http", &config);
//!
//! // Layers added last run first: the scope wraps the identifier stage,
//! // which wraps the request logger, which wraps the handlers.
//! let app: Router = Router::new()
//!     .route("/orders", get(|| async { "ok" }))
//!     .layer(RequestLogging::new(logger).layer())
//!     .layer(middleware::from_fn(assign_request_id))
//!     .layer(middleware::from_fn(open_context));
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

mod correlate;
mod redact;
mod request_log;

pub use correlate::{assign_request_id, open_context};
pub use redact::{redact_body, sanitize_headers, sanitize_request_field, sanitize_response_field};
pub use request_log::{RequestLogging, RequestLoggingLayer, RequestLoggingService};
