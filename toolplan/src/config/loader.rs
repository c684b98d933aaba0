//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use serde_yaml::Mapping;
use tracing::debug;

use super::{validate_config, ReasonerConfig};
use crate::error::ConfigError;

/// Load, validate and type a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<ReasonerConfig, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let value: serde_yaml::Value = serde_yaml::from_str(&text)?;
    let config = ReasonerConfig::from_yaml_value(value)?;
    debug!(
        path = %path.display(),
        model = %config.llm.model,
        provider = %config.llm.provider,
        "loaded reasoner configuration"
    );
    Ok(config)
}

/// Load a configuration file as a validated raw mapping.
pub fn load_config_mapping(path: impl AsRef<Path>) -> Result<Mapping, ConfigError> {
    let text = fs::read_to_string(path.as_ref())?;
    let value: serde_yaml::Value = serde_yaml::from_str(&text)?;
    let Some(mapping) = value.as_mapping() else {
        return Err(ConfigError::NotAMapping);
    };
    validate_config(mapping)?;
    Ok(mapping.clone())
}
