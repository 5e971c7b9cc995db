//! # Configuration System
//!
//! Centralized configuration management for the study notebook engine.
//!
//! This crate provides:
//! - Configuration structures for generation, queue, storage and logging
//! - Environment variable loading (12-factor app principles)
//! - Configuration file loading (TOML/YAML)
//! - Configuration precedence (env > file > defaults)
//! - Configuration validation

pub mod config;
pub mod file_loader;
pub mod loader;
pub mod precedence;
pub mod validation;

pub use config::{Config, GenerationConfig, ObservabilityConfig, QueueConfig, StorageConfig};
pub use file_loader::{ConfigFileError, load_from_file, load_from_toml, load_from_yaml};
pub use loader::load_from_env;
pub use precedence::merge_configs;
pub use validation::validate_config;
pub use validator::Validate;
