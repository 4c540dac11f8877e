//! Prelude module - commonly used types for convenient import.
//!
//! Use `use lantern_telemetry::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust,no_run
//! use lantern_telemetry::prelude::*;
//!
//! # fn main() -> TelemetryResult<()> {
//! let config = TelemetryConfig::from_env()?;
//! let logger = Logger::new("payments", &config);
//!
//! logger.log("charge accepted", Some("ChargeService"));
//! logger.error("charge declined", None, Some("ChargeService"));
//! # Ok(())
//! # }
//! ```

// Errors
pub use crate::{TelemetryError, TelemetryResult};

// Configuration
pub use crate::{Environment, TelemetryConfig};

// Logging
pub use crate::{Level, LogEntry, Logger};

// Transports
pub use crate::{MemoryTransport, Transport, TransportKind};

// Tracing bridge
pub use crate::{TracingBridge, init_tracing};

// Request context
pub use crate::context;
