//! # Configuration Validation
//!
//! Provides validation for all configuration structures using the `validator` crate.

use crate::config::Config;
use validator::Validate;

/// Validate configuration structure.
///
/// # M-CANONICAL-DOCS
///
/// ## Usage
/// ```rust,no_run
/// use config::{Config, validate_config};
///
/// let config = Config::default();
/// match validate_config(&config) {
///     Ok(()) => println!("Configuration is valid"),
///     Err(errors) => println!("Validation errors: {:?}", errors),
/// }
/// ```
///
/// ## Validation Rules
/// ### Generation
/// - `base_url`: 1-255 characters
/// - `reasoning_model`, `fast_model`: 1-128 characters
/// - `domain`: 1-64 characters
/// - `request_timeout_secs`: 1-600 when set
/// - `continuation_excerpt_chars`: 1-10000
/// - `prior_context_chars`: at most 20000
///
/// ### Queue
/// - `event_capacity`: 1-4096
///
/// ### Observability
/// - `logging_level`: must be trace, debug, info, warn or error
pub fn validate_config(config: &Config) -> Result<(), validator::ValidationErrors> {
    config.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        let mut config = Config::default();
        config.generation.reasoning_model = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.generation.request_timeout_secs = Some(0);
        assert!(validate_config(&config).is_err());

        config.generation.request_timeout_secs = Some(120);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_event_capacity() {
        let mut config = Config::default();
        config.queue.event_capacity = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_logging_level() {
        let mut config = Config::default();
        for level in ["trace", "debug", "info", "warn", "error"] {
            config.observability.logging_level = level.to_string();
            assert!(validate_config(&config).is_ok(), "{level} should be valid");
        }

        config.observability.logging_level = "verbose".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_data_path() {
        let mut config = Config::default();
        config.storage.data_path = String::new();
        assert!(validate_config(&config).is_err());
    }
}
