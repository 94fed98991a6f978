//! Configuration validator for heapscope
//!
//! Validates configuration values to ensure they are within acceptable ranges.

use super::loader::{Config, ConfigError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_scan(&config.scan)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    /// Validates scan configuration
    fn validate_scan(scan: &super::loader::ScanConfig) -> Result<(), ConfigError> {
        if scan.top_n == 0 {
            return Err(ConfigError::Invalid(
                "Summary top_n must be at least 1".to_string(),
            ));
        }

        if scan.min_expand_size == 0 {
            return Err(ConfigError::Invalid(
                "Minimum expand size must be at least 1".to_string(),
            ));
        }

        // A threshold beyond any sane object size prunes everything
        if scan.min_expand_size > 4096 {
            return Err(ConfigError::Invalid(
                "Minimum expand size cannot exceed 4096".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates logging configuration
    fn validate_logging(logging: &super::loader::LoggingConfig) -> Result<(), ConfigError> {
        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, valid_levels
            )));
        }

        // Validate log file path
        if logging.file.is_empty() {
            return Err(ConfigError::Invalid(
                "Log file path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}
