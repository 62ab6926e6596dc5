//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{CourierConfig, DispatcherConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &CourierConfig) -> ConfigResult<()> {
    validate_dispatcher_config(&config.dispatcher)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_dispatcher_config(dispatcher: &DispatcherConfig) -> ConfigResult<()> {
    if dispatcher.update_buffer == 0 {
        return Err(ConfigError::validation(
            "dispatcher.update_buffer must be greater than 0",
        ));
    }
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output != LogOutput::File {
        return Ok(());
    }

    let Some(path) = &logging.file_path else {
        return Err(ConfigError::missing_field("logging.file_path"));
    };
    if path.file_name().is_none() {
        return Err(ConfigError::validation(format!(
            "logging.file_path must name a file: {}",
            path.display()
        )));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && parent.is_file()
    {
        return Err(ConfigError::validation(format!(
            "logging.file_path parent is not a directory: {}",
            parent.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&CourierConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let mut config = CourierConfig::default();
        config.dispatcher.update_buffer = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_file_output_needs_path() {
        let mut config = CourierConfig::default();
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { field }) if field == "logging.file_path"
        ));

        config.logging.file_path = Some(PathBuf::from("logs/courier.log"));
        assert!(validate_config(&config).is_ok());

        config.logging.file_path = Some(PathBuf::from("/"));
        assert!(validate_config(&config).is_err());
    }
}
