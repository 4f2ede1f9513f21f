//! ## arbor-telemetry::logging
//! **Structured logging through `tracing`**
//!
//! `EventLogger::init` installs a `fmt` subscriber writing to stderr, so
//! command output on stdout stays machine-readable. `RUST_LOG` overrides the
//! configured level when set.

use arbor_config::TelemetryConfig;
use tracing::{info, info_span, warn};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::TelemetryError;

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. Fails if one is already installed.
    pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_lowercase()));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_thread_names(config.thread_names)
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
            .map_err(|err| TelemetryError::Subscriber(err.to_string()))
    }

    /// Records the outcome of reading one document.
    pub fn log_document(source: &str, bytes: usize, outcome: Result<&str, &str>) {
        let span = info_span!("document", source = source, bytes = bytes);
        let _enter = span.enter();
        match outcome {
            Ok(root) => info!(root = root, "document parsed"),
            Err(error) => warn!(error = error, "document rejected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn logs_document_outcomes() {
        EventLogger::log_document("inline", 2, Ok("object"));
        assert!(logs_contain("document parsed"));

        EventLogger::log_document("inline", 1, Err("unexpected end of input"));
        assert!(logs_contain("document rejected"));
        assert!(logs_contain("unexpected end of input"));
    }
}
