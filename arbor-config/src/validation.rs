//! Custom validation functions for configuration.

use validator::ValidationError;

/// Validate that the provided ring capacity is a power of two of at least 2.
pub fn validate_ring_capacity(value: usize) -> Result<(), ValidationError> {
    if value >= 2 && value.is_power_of_two() {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_power_of_two"))
    }
}

/// Validate a tracing verbosity level.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid = ["trace", "debug", "info", "warn", "error"]
        .contains(&level.to_lowercase().as_str());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}
