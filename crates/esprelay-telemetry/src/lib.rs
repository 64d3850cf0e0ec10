//! Prometheus metrics and structured logging for esprelay.
//!
//! Provides observability for the relay:
//! - Prometheus metrics for client connections, broadcasts, and ingest
//! - Structured JSON logging with tracing

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
