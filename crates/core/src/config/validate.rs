use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Availability country is set
/// - Checkpoint interval is positive
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.availability.country.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "availability.country cannot be empty".to_string(),
        ));
    }

    if config.availability.checkpoint_interval == 0 {
        return Err(ConfigError::ValidationError(
            "availability.checkpoint_interval must be at least 1".to_string(),
        ));
    }

    Ok(())
}
