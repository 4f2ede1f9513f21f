//! Telemetry configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

/// Logging settings
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct TelemetryConfig {
    /// Logging verbosity level; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    #[validate(custom(function = validation::validate_log_level))]
    pub log_level: String,

    /// Include thread names in log lines (tells the lexer thread apart).
    #[serde(default = "default_true")]
    pub thread_names: bool,
}

fn default_log_level() -> String {
    "warn".into()
}

fn default_true() -> bool {
    true
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            thread_names: default_true(),
        }
    }
}
