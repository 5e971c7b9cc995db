//! Configuration from `SN_` prefixed environment variables.

use crate::config::{
    Config, GenerationConfig, ObservabilityConfig, QueueConfig, StorageConfig, default_base_url,
    default_continuation_excerpt_chars, default_data_path, default_domain,
    default_event_capacity, default_fast_model, default_logging_level, default_metrics_enabled,
    default_prior_context_chars, default_reasoning_model,
};
use std::env;

/// Reads every `SN_` variable on top of the defaults. A variable that is
/// unset or fails to parse keeps its default.
///
/// - `SN_API_KEY`: API key (falls back to `GEMINI_API_KEY`)
/// - `SN_BASE_URL`: Service endpoint root
/// - `SN_REASONING_MODEL`, `SN_FAST_MODEL`: Model names
/// - `SN_DOMAIN`: Default domain (default: "Physics")
/// - `SN_DETAIL_LEVEL`: strict/expanded (default: expanded)
/// - `SN_REQUEST_TIMEOUT_SECS`: Per-request timeout (default: none)
/// - `SN_CONTINUATION_EXCERPT_CHARS` (default: 300)
/// - `SN_PRIOR_CONTEXT_CHARS` (default: 500)
/// - `SN_EVENT_CAPACITY` (default: 64)
/// - `SN_DATA_PATH` (default: "studynote_data.json")
/// - `SN_LOG_LEVEL`: trace/debug/info/warn/error (default: "info")
/// - `SN_METRICS_ENABLED`: true/false (default: true)
pub fn load_from_env() -> Result<Config, Box<dyn std::error::Error>> {
    let config = Config {
        generation: load_generation_from_env()?,
        queue: load_queue_from_env()?,
        storage: load_storage_from_env()?,
        observability: load_observability_from_env()?,
    };

    Ok(config)
}

fn load_generation_from_env() -> Result<GenerationConfig, Box<dyn std::error::Error>> {
    Ok(GenerationConfig {
        api_key: env::var("SN_API_KEY")
            .or_else(|_| env::var("GEMINI_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty()),
        base_url: env::var("SN_BASE_URL").unwrap_or_else(|_| default_base_url()),
        reasoning_model: env::var("SN_REASONING_MODEL")
            .unwrap_or_else(|_| default_reasoning_model()),
        fast_model: env::var("SN_FAST_MODEL").unwrap_or_else(|_| default_fast_model()),
        domain: env::var("SN_DOMAIN").unwrap_or_else(|_| default_domain()),
        detail_level: parse_env("SN_DETAIL_LEVEL").unwrap_or_default(),
        request_timeout_secs: parse_env("SN_REQUEST_TIMEOUT_SECS").ok(),
        continuation_excerpt_chars: parse_env("SN_CONTINUATION_EXCERPT_CHARS")
            .unwrap_or_else(|_| default_continuation_excerpt_chars()),
        prior_context_chars: parse_env("SN_PRIOR_CONTEXT_CHARS")
            .unwrap_or_else(|_| default_prior_context_chars()),
    })
}

fn load_queue_from_env() -> Result<QueueConfig, Box<dyn std::error::Error>> {
    Ok(QueueConfig {
        event_capacity: parse_env("SN_EVENT_CAPACITY").unwrap_or_else(|_| default_event_capacity()),
    })
}

fn load_storage_from_env() -> Result<StorageConfig, Box<dyn std::error::Error>> {
    Ok(StorageConfig {
        data_path: env::var("SN_DATA_PATH").unwrap_or_else(|_| default_data_path()),
    })
}

fn load_observability_from_env() -> Result<ObservabilityConfig, Box<dyn std::error::Error>> {
    Ok(ObservabilityConfig {
        logging_level: env::var("SN_LOG_LEVEL").unwrap_or_else(|_| default_logging_level()),
        metrics_enabled: parse_env("SN_METRICS_ENABLED")
            .unwrap_or_else(|_| default_metrics_enabled()),
    })
}

fn parse_env<T>(key: &str) -> Result<T, Box<dyn std::error::Error>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(s) => s
            .parse::<T>()
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error>),
        Err(e) => Err(Box::new(e) as Box<dyn std::error::Error>),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nb_core::DetailLevel;
    use serial_test::serial;

    const ALL_VARS: &[&str] = &[
        "SN_API_KEY",
        "GEMINI_API_KEY",
        "SN_BASE_URL",
        "SN_REASONING_MODEL",
        "SN_FAST_MODEL",
        "SN_DOMAIN",
        "SN_DETAIL_LEVEL",
        "SN_REQUEST_TIMEOUT_SECS",
        "SN_CONTINUATION_EXCERPT_CHARS",
        "SN_PRIOR_CONTEXT_CHARS",
        "SN_EVENT_CAPACITY",
        "SN_DATA_PATH",
        "SN_LOG_LEVEL",
        "SN_METRICS_ENABLED",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_load_from_env_defaults() {
        clear_env();

        let config = load_from_env().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn test_load_generation_from_env() {
        clear_env();
        unsafe {
            env::set_var("SN_API_KEY", "key-123");
            env::set_var("SN_DOMAIN", "Chemistry");
            env::set_var("SN_DETAIL_LEVEL", "strict");
            env::set_var("SN_REQUEST_TIMEOUT_SECS", "90");
            env::set_var("SN_CONTINUATION_EXCERPT_CHARS", "120");
        }

        let generation = load_generation_from_env().unwrap();
        clear_env();

        assert_eq!(generation.api_key.as_deref(), Some("key-123"));
        assert_eq!(generation.domain, "Chemistry");
        assert_eq!(generation.detail_level, DetailLevel::Strict);
        assert_eq!(generation.request_timeout_secs, Some(90));
        assert_eq!(generation.continuation_excerpt_chars, 120);
        assert_eq!(generation.fast_model, "gemini-3-flash-preview");
    }

    #[test]
    #[serial]
    fn test_api_key_falls_back_to_gemini_variable() {
        clear_env();
        unsafe {
            env::set_var("GEMINI_API_KEY", "fallback");
        }

        let generation = load_generation_from_env().unwrap();
        clear_env();

        assert_eq!(generation.api_key.as_deref(), Some("fallback"));
    }

    #[test]
    #[serial]
    fn test_invalid_number_keeps_default() {
        clear_env();
        unsafe {
            env::set_var("SN_EVENT_CAPACITY", "lots");
            env::set_var("SN_METRICS_ENABLED", "false");
        }

        let config = load_from_env().unwrap();
        clear_env();

        assert_eq!(config.queue.event_capacity, 64);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    #[serial]
    fn test_load_storage_and_logging_from_env() {
        clear_env();
        unsafe {
            env::set_var("SN_DATA_PATH", "/tmp/notebook.json");
            env::set_var("SN_LOG_LEVEL", "debug");
        }

        let config = load_from_env().unwrap();
        clear_env();

        assert_eq!(config.storage.data_path, "/tmp/notebook.json");
        assert_eq!(config.observability.logging_level, "debug");
    }
}
