//! Reads a notebook [`Config`] from a TOML or YAML file, picking the
//! parser from the file extension.

use crate::config::Config;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    TomlParse(String),

    #[error("Invalid YAML in config file: {0}")]
    YamlParse(String),

    #[error("Config file has no extension")]
    NoExtension,

    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(String),
}

fn read(path: &Path) -> Result<String, ConfigFileError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigFileError::FileNotFound(path.display().to_string()),
        _ => ConfigFileError::Io(e),
    })
}

/// ```rust,no_run
/// let config = config::load_from_toml(std::path::Path::new("notebook.toml"))?;
/// assert!(!config.generation.fast_model.is_empty());
/// # Ok::<(), config::ConfigFileError>(())
/// ```
pub fn load_from_toml(path: &Path) -> Result<Config, ConfigFileError> {
    toml::from_str(&read(path)?).map_err(|e| ConfigFileError::TomlParse(e.to_string()))
}

pub fn load_from_yaml(path: &Path) -> Result<Config, ConfigFileError> {
    serde_yaml::from_str(&read(path)?).map_err(|e| ConfigFileError::YamlParse(e.to_string()))
}

/// Dispatches on `.toml`, `.yaml` or `.yml`, compared case-insensitively.
pub fn load_from_file(path: &Path) -> Result<Config, ConfigFileError> {
    let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
        return Err(ConfigFileError::NoExtension);
    };

    match extension.to_ascii_lowercase().as_str() {
        "toml" => load_from_toml(path),
        "yaml" | "yml" => load_from_yaml(path),
        other => Err(ConfigFileError::UnsupportedFormat(other.to_string())),
    }
}
