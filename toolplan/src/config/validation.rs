//! Structural validation of raw configuration mappings.

use serde_yaml::{Mapping, Value};

use crate::error::ConfigError;

/// Highest configuration major version this crate understands.
pub const SUPPORTED_MAJOR_VERSION: u64 = 1;

const REQUIRED_SECTIONS: [&str; 2] = ["llm", "reasoning"];

/// Validate a raw configuration mapping.
///
/// Requires the `llm` and `reasoning` sections. An optional `version` whose
/// major component is numeric must not exceed [`SUPPORTED_MAJOR_VERSION`];
/// non-numeric versions are accepted as-is.
pub fn validate_config(config: &Mapping) -> Result<(), ConfigError> {
    for section in REQUIRED_SECTIONS {
        if !config.contains_key(section) {
            return Err(ConfigError::MissingSection(section.to_string()));
        }
    }

    let Some(version) = config.get("version") else {
        return Ok(());
    };

    let version = match version {
        Value::Null => return Ok(()),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => {
            return Err(ConfigError::Invalid(
                "version must be a number or string".to_string(),
            ))
        }
    };

    if let Some(major) = parse_major(&version) {
        if major > SUPPORTED_MAJOR_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                version,
                supported: SUPPORTED_MAJOR_VERSION,
            });
        }
    }
    Ok(())
}

fn parse_major(version: &str) -> Option<u64> {
    version.trim().split('.').next()?.parse().ok()
}
