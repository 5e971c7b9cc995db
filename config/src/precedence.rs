//! Merging of configuration sources. Environment variables beat the config
//! file, which beats the built-in defaults.

use crate::config::{
    Config, GenerationConfig, ObservabilityConfig, QueueConfig, StorageConfig, default_base_url,
    default_continuation_excerpt_chars, default_data_path, default_domain,
    default_event_capacity, default_fast_model, default_logging_level, default_metrics_enabled,
    default_prior_context_chars, default_reasoning_model,
};
use nb_core::DetailLevel;

/// Layers `file_config` then `env_config` over `defaults`.
///
/// A field from a later source wins only when it differs from its default,
/// so a source that leaves a field unset never resets an earlier override.
/// Each layer logs the fields it changed.
pub fn merge_configs(
    defaults: Config,
    file_config: Config,
    file_source_name: &str,
    env_config: Config,
    env_source_name: &str,
) -> Config {
    let config = merge_with_logging(defaults, file_config, file_source_name);
    merge_with_logging(config, env_config, env_source_name)
}

fn merge_with_logging(mut base: Config, override_config: Config, source_name: &str) -> Config {
    let mut changes = Vec::new();

    merge_generation(
        &mut base.generation,
        &override_config.generation,
        &mut changes,
    );
    merge_queue(&mut base.queue, &override_config.queue, &mut changes);
    merge_storage(&mut base.storage, &override_config.storage, &mut changes);
    merge_observability(
        &mut base.observability,
        &override_config.observability,
        &mut changes,
    );

    if !changes.is_empty() {
        tracing::info!("Configuration from {}: {:?}", source_name, changes);
    }

    base
}

fn merge_generation(
    base: &mut GenerationConfig,
    override_config: &GenerationConfig,
    changes: &mut Vec<String>,
) {
    if let Some(key) = &override_config.api_key
        && base.api_key.as_ref() != Some(key)
    {
        changes.push("generation.api_key = ***".to_string());
        base.api_key = Some(key.clone());
    }
    if override_config.base_url != default_base_url() && override_config.base_url != base.base_url
    {
        changes.push(format!("generation.base_url = {}", override_config.base_url));
        base.base_url.clone_from(&override_config.base_url);
    }
    if override_config.reasoning_model != default_reasoning_model()
        && override_config.reasoning_model != base.reasoning_model
    {
        changes.push(format!(
            "generation.reasoning_model = {}",
            override_config.reasoning_model
        ));
        base.reasoning_model.clone_from(&override_config.reasoning_model);
    }
    if override_config.fast_model != default_fast_model()
        && override_config.fast_model != base.fast_model
    {
        changes.push(format!(
            "generation.fast_model = {}",
            override_config.fast_model
        ));
        base.fast_model.clone_from(&override_config.fast_model);
    }
    if override_config.domain != default_domain() && override_config.domain != base.domain {
        changes.push(format!("generation.domain = {}", override_config.domain));
        base.domain.clone_from(&override_config.domain);
    }
    if override_config.detail_level != DetailLevel::default()
        && override_config.detail_level != base.detail_level
    {
        changes.push(format!(
            "generation.detail_level = {}",
            override_config.detail_level
        ));
        base.detail_level = override_config.detail_level;
    }
    if let Some(timeout) = override_config.request_timeout_secs
        && base.request_timeout_secs != Some(timeout)
    {
        changes.push(format!("generation.request_timeout_secs = {timeout}"));
        base.request_timeout_secs = Some(timeout);
    }
    if override_config.continuation_excerpt_chars != default_continuation_excerpt_chars()
        && override_config.continuation_excerpt_chars != base.continuation_excerpt_chars
    {
        changes.push(format!(
            "generation.continuation_excerpt_chars = {}",
            override_config.continuation_excerpt_chars
        ));
        base.continuation_excerpt_chars = override_config.continuation_excerpt_chars;
    }
    if override_config.prior_context_chars != default_prior_context_chars()
        && override_config.prior_context_chars != base.prior_context_chars
    {
        changes.push(format!(
            "generation.prior_context_chars = {}",
            override_config.prior_context_chars
        ));
        base.prior_context_chars = override_config.prior_context_chars;
    }
}

fn merge_queue(base: &mut QueueConfig, override_config: &QueueConfig, changes: &mut Vec<String>) {
    if override_config.event_capacity != default_event_capacity()
        && override_config.event_capacity != base.event_capacity
    {
        changes.push(format!(
            "queue.event_capacity = {}",
            override_config.event_capacity
        ));
        base.event_capacity = override_config.event_capacity;
    }
}

fn merge_storage(
    base: &mut StorageConfig,
    override_config: &StorageConfig,
    changes: &mut Vec<String>,
) {
    if override_config.data_path != default_data_path()
        && override_config.data_path != base.data_path
    {
        changes.push(format!("storage.data_path = {}", override_config.data_path));
        base.data_path.clone_from(&override_config.data_path);
    }
}

fn merge_observability(
    base: &mut ObservabilityConfig,
    override_config: &ObservabilityConfig,
    changes: &mut Vec<String>,
) {
    if override_config.logging_level != default_logging_level()
        && override_config.logging_level != base.logging_level
    {
        changes.push(format!(
            "observability.logging_level = {}",
            override_config.logging_level
        ));
        base.logging_level.clone_from(&override_config.logging_level);
    }
    if override_config.metrics_enabled != default_metrics_enabled()
        && override_config.metrics_enabled != base.metrics_enabled
    {
        changes.push(format!(
            "observability.metrics_enabled = {}",
            override_config.metrics_enabled
        ));
        base.metrics_enabled = override_config.metrics_enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_defaults_only() {
        let merged = merge_configs(
            Config::default(),
            Config::default(),
            "file",
            Config::default(),
            "env",
        );
        assert_eq!(merged, Config::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = Config::default();
        file.generation.domain = "Chemistry".to_string();
        file.queue.event_capacity = 8;

        let mut env = Config::default();
        env.generation.domain = "Biology".to_string();

        let merged = merge_configs(Config::default(), file, "file", env, "env");
        assert_eq!(merged.generation.domain, "Biology");
        assert_eq!(merged.queue.event_capacity, 8);
    }

    #[test]
    fn test_default_valued_source_does_not_reset_override() {
        let mut file = Config::default();
        file.observability.logging_level = "debug".to_string();
        file.generation.request_timeout_secs = Some(30);

        let merged = merge_configs(Config::default(), file, "file", Config::default(), "env");
        assert_eq!(merged.observability.logging_level, "debug");
        assert_eq!(merged.generation.request_timeout_secs, Some(30));
    }

    #[test]
    fn test_api_key_from_env_wins() {
        let mut file = Config::default();
        file.generation.api_key = Some("from-file".to_string());
        let mut env = Config::default();
        env.generation.api_key = Some("from-env".to_string());

        let merged = merge_configs(Config::default(), file, "file", env, "env");
        assert_eq!(merged.generation.api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_detail_level_and_metrics_flags_merge() {
        let mut env = Config::default();
        env.generation.detail_level = DetailLevel::Strict;
        env.observability.metrics_enabled = false;

        let merged = merge_configs(Config::default(), Config::default(), "file", env, "env");
        assert_eq!(merged.generation.detail_level, DetailLevel::Strict);
        assert!(!merged.observability.metrics_enabled);
    }
}
