use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to install log subscriber: {0}")]
    Subscriber(String),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}
