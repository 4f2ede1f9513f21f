use std::io;
use std::path::PathBuf;

use arbor_config::ConfigError;
use arbor_telemetry::TelemetryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Json(#[from] arbor_json::Error),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
