//! # Arbor Telemetry
//!
//! Log subscriber setup and Prometheus metrics for the arbor tools.

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
