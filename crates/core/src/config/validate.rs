use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Cancel grace period is not 0
/// - Event buffer is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.engine.cancel_grace_ms == 0 {
        return Err(ConfigError::ValidationError(
            "engine.cancel_grace_ms cannot be 0".to_string(),
        ));
    }

    if config.engine.event_buffer == 0 {
        return Err(ConfigError::ValidationError(
            "engine.event_buffer cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, ServerConfig};

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                port: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_grace_fails() {
        let config = Config {
            engine: EngineConfig::default().with_cancel_grace_ms(0),
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_event_buffer_fails() {
        let config = Config {
            engine: EngineConfig {
                event_buffer: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
