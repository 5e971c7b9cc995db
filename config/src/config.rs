//! # Configuration Structures
//!
//! This module defines the configuration structures for the study notebook
//! engine.
//!
//! All configuration structures:
//! - Use `serde` for serialization/deserialization, every field defaulted
//! - Use `validator` for input validation

use nb_core::DetailLevel;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Top-level configuration.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Aggregates the settings of the generation client, the task queue, the
/// notebook file and logging.
///
/// ## Usage
/// ```rust,no_run
/// use config::Config;
///
/// let config = Config::default();
/// println!("Reasoning model: {}", config.generation.reasoning_model);
/// ```
///
/// ## Validation
/// All nested configurations must pass their own validation rules.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, PartialEq)]
pub struct Config {
    /// Generation service connection and prompt settings
    #[serde(default)]
    #[validate(nested)]
    pub generation: GenerationConfig,

    /// Task queue settings
    #[serde(default)]
    #[validate(nested)]
    pub queue: QueueConfig,

    /// Notebook persistence
    #[serde(default)]
    #[validate(nested)]
    pub storage: StorageConfig,

    /// Logging and metrics
    #[serde(default)]
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

/// Generation service configuration.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Selects the hosted models and how notes are generated from raw input.
///
/// ## Fields
/// - `api_key`: API key of the hosted service (optional until a request is
///   made)
/// - `base_url`: Service endpoint root
/// - `reasoning_model`: Model used for note generation, integration and
///   problem extraction
/// - `fast_model`: Model used for every other call
/// - `domain`: Default subject domain for prompts (default: "Physics")
/// - `detail_level`: Strict or expanded notes (default: expanded)
/// - `request_timeout_secs`: Per-request timeout; unset means no timeout
/// - `continuation_excerpt_chars`: Trailing explanation characters shown to
///   the continuation judgment (default: 300)
/// - `prior_context_chars`: Characters of prior note context passed to
///   generation (default: 500)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct GenerationConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    #[validate(length(min = 1, max = 255))]
    pub base_url: String,

    #[serde(default = "default_reasoning_model")]
    #[validate(length(min = 1, max = 128))]
    pub reasoning_model: String,

    #[serde(default = "default_fast_model")]
    #[validate(length(min = 1, max = 128))]
    pub fast_model: String,

    #[serde(default = "default_domain")]
    #[validate(length(min = 1, max = 64))]
    pub domain: String,

    #[serde(default)]
    pub detail_level: DetailLevel,

    #[serde(default)]
    #[validate(range(min = 1, max = 600))]
    pub request_timeout_secs: Option<u64>,

    #[serde(default = "default_continuation_excerpt_chars")]
    #[validate(range(min = 1, max = 10000))]
    pub continuation_excerpt_chars: usize,

    #[serde(default = "default_prior_context_chars")]
    #[validate(range(max = 20000))]
    pub prior_context_chars: usize,
}

pub(crate) fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

pub(crate) fn default_reasoning_model() -> String {
    "gemini-3-pro-preview".to_string()
}

pub(crate) fn default_fast_model() -> String {
    "gemini-3-flash-preview".to_string()
}

pub(crate) fn default_domain() -> String {
    "Physics".to_string()
}

pub(crate) fn default_continuation_excerpt_chars() -> usize {
    300
}

pub(crate) fn default_prior_context_chars() -> usize {
    500
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            reasoning_model: default_reasoning_model(),
            fast_model: default_fast_model(),
            domain: default_domain(),
            detail_level: DetailLevel::default(),
            request_timeout_secs: None,
            continuation_excerpt_chars: default_continuation_excerpt_chars(),
            prior_context_chars: default_prior_context_chars(),
        }
    }
}

/// Task queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct QueueConfig {
    /// Buffered queue events per subscriber before slow receivers lag
    #[serde(default = "default_event_capacity")]
    #[validate(range(min = 1, max = 4096))]
    pub event_capacity: usize,
}

pub(crate) fn default_event_capacity() -> usize {
    64
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            event_capacity: default_event_capacity(),
        }
    }
}

/// Notebook file location.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_data_path")]
    #[validate(length(min = 1, max = 4096))]
    pub data_path: String,
}

pub(crate) fn default_data_path() -> String {
    "studynote_data.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
        }
    }
}

/// Observability configuration.
///
/// # M-CANONICAL-DOCS
///
/// ## Fields
/// - `logging_level`: trace/debug/info/warn/error (default: "info")
/// - `metrics_enabled`: Record queue metrics (default: true)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ObservabilityConfig {
    #[serde(default = "default_logging_level")]
    #[validate(custom(function = "validate_logging_level"))]
    pub logging_level: String,

    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

pub(crate) fn default_logging_level() -> String {
    "info".to_string()
}

pub(crate) fn default_metrics_enabled() -> bool {
    true
}

fn validate_logging_level(value: &str) -> Result<(), validator::ValidationError> {
    match value {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(validator::ValidationError::new("Invalid logging level")),
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            logging_level: default_logging_level(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(
            config.generation.base_url,
            "https://generativelanguage.googleapis.com"
        );
        assert_eq!(config.generation.reasoning_model, "gemini-3-pro-preview");
        assert_eq!(config.generation.fast_model, "gemini-3-flash-preview");
        assert_eq!(config.generation.domain, "Physics");
        assert_eq!(config.generation.detail_level, DetailLevel::Expanded);
        assert_eq!(config.generation.request_timeout_secs, None);
        assert_eq!(config.generation.continuation_excerpt_chars, 300);
        assert_eq!(config.generation.prior_context_chars, 500);
        assert_eq!(config.queue.event_capacity, 64);
        assert_eq!(config.storage.data_path, "studynote_data.json");
        assert_eq!(config.observability.logging_level, "info");
        assert!(config.observability.metrics_enabled);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"generation":{"domain":"Chemistry"}}"#).unwrap();
        assert_eq!(config.generation.domain, "Chemistry");
        assert_eq!(config.generation.fast_model, "gemini-3-flash-preview");
    }

    #[test]
    fn test_detail_level_accepts_lowercase() {
        let config: Config =
            serde_json::from_str(r#"{"generation":{"detail_level":"strict"}}"#).unwrap();
        assert_eq!(config.generation.detail_level, DetailLevel::Strict);
    }

    #[test]
    fn test_default_passes_validation() {
        assert!(Config::default().validate().is_ok());
    }
}
