//! YAML configuration loading and parsing

use crate::config::AlgorithmConfig;
use crate::error::{AppPackError, Result};
use crate::system::System;
use std::path::Path;
use tracing::{debug, warn};

/// Load, parse and fully validate an algorithm configuration file
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist
/// - The file is not valid YAML
/// - Required fields are missing, types are unrecognized, or a rule is broken
#[inline]
pub fn load_config(system: &dyn System, path: &str) -> Result<AlgorithmConfig> {
    let config = read_config(system, path)?;
    config.validate()?;
    Ok(config)
}

/// Read and parse an algorithm configuration without the semantic checks
///
/// Lets callers merge overrides (such as the container image) before
/// running [`AlgorithmConfig::validate`].
///
/// # Errors
///
/// Returns an error if the file is missing, malformed, or fails the schema
#[inline]
pub fn read_config(system: &dyn System, path: &str) -> Result<AlgorithmConfig> {
    let path_obj = Path::new(path);

    if !system.is_file(path_obj) {
        return Err(AppPackError::ConfigNotFound {
            path: path_obj.to_path_buf(),
        });
    }

    let content = system
        .read_to_string(path_obj)
        .map_err(|e| AppPackError::ConfigParse {
            path: path_obj.to_path_buf(),
            message: format!("failed to read file: {e}"),
        })?;

    debug!("Read {} bytes of configuration from {}", content.len(), path);
    parse_config(&content, path_obj)
}

/// Parse algorithm configuration text
///
/// `origin` is only used in error messages.
///
/// # Errors
///
/// Returns a parse error for malformed YAML and a validation error when the
/// document does not match the schema or the typed model
#[inline]
pub fn parse_config(content: &str, origin: &Path) -> Result<AlgorithmConfig> {
    let document: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| AppPackError::ConfigParse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;

    let config_value = serde_json::to_value(&document).map_err(|e| AppPackError::ConfigParse {
        path: origin.to_path_buf(),
        message: format!("unsupported YAML construct: {e}"),
    })?;

    crate::config::schema::validate_against_schema(&config_value)?;
    for key in crate::config::schema::unknown_keys(&config_value)? {
        warn!("Unknown key '{}' in {} is ignored", key, origin.display());
    }

    let config: AlgorithmConfig = serde_json::from_value(config_value).map_err(|e| {
        AppPackError::validation(format!("{}: {e}", origin.display()))
    })?;

    for key in config.unset_optional_keys() {
        debug!("Expected key '{}' not found in {}", key, origin.display());
    }

    Ok(config)
}
