//! Configuration validation logic

use crate::config::{AlgorithmConfig, InputSpec, OutputSpec};
use crate::error::{AppPackError, Result};
use regex::Regex;
use std::collections::HashSet;

/// CWL parameter and process identifiers
const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_.-]*$";

/// Container image reference: `[registry[:port]/]path[:tag][@digest]`, no whitespace
const IMAGE_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9._\-/:]*(@[A-Za-z0-9]+:[A-Fa-f0-9]+)?$";

/// Validate a complete algorithm configuration
///
/// # Errors
///
/// Returns an error if:
/// - The process id, command or container image is missing or malformed
/// - A parameter name is invalid or declared twice
/// - An output is not a `File` or `Directory` type
/// - A resource requirement is zero
#[inline]
pub fn validate_config(config: &AlgorithmConfig) -> Result<()> {
    validate_identifier(&config.process_id).map_err(|e| field_error("algorithm_name", &e))?;

    if config.command.trim().is_empty() {
        return Err(field_error("run_command", "Command cannot be empty"));
    }

    match config.image.as_deref() {
        Some(image) => validate_image_reference(image).map_err(|e| field_error("docker_image", &e))?,
        None => {
            return Err(field_error(
                "docker_image",
                "A container image reference is required",
            ));
        }
    }

    let mut seen = HashSet::new();
    for name in config.parameter_names() {
        if !seen.insert(name) {
            return Err(AppPackError::validation(format!(
                "Duplicate parameter name '{name}'. Input and output names must be unique"
            )));
        }
    }

    for (index, input) in config.inputs.iter().enumerate() {
        validate_input(input, index)?;
    }

    for (index, output) in config.outputs.iter().enumerate() {
        validate_output(output, index)?;
    }

    for (field, value) in [
        ("ram_min", config.ram_min),
        ("cores_min", config.cores_min.map(u64::from)),
        ("outdir_max", config.outdir_max),
    ] {
        if value == Some(0) {
            return Err(field_error(field, "Resource requirements must be positive"));
        }
    }

    Ok(())
}

fn field_error(field: &str, message: &str) -> AppPackError {
    AppPackError::validation(format!("Field '{field}': {message}"))
}

/// Validate a single input declaration
fn validate_input(input: &InputSpec, index: usize) -> Result<()> {
    let context = format!("Input #{} ('{}')", index + 1, input.name);

    validate_identifier(&input.name).map_err(|e| AppPackError::validation(format!("{context}: {e}")))?;

    if input.position == Some(0) {
        return Err(AppPackError::validation(format!(
            "{context}: Positions start at 1"
        )));
    }

    if input.param_type.is_path_like()
        && !input.param_type.array
        && let Some(default) = input.default.as_ref()
        && !default.is_string()
    {
        return Err(AppPackError::validation(format!(
            "{context}: Default of a {} input must be a path string",
            input.param_type
        )));
    }

    Ok(())
}

/// Validate a single output declaration
fn validate_output(output: &OutputSpec, index: usize) -> Result<()> {
    let context = format!("Output #{} ('{}')", index + 1, output.name);

    validate_identifier(&output.name)
        .map_err(|e| AppPackError::validation(format!("{context}: {e}")))?;

    if !output.param_type.is_path_like() {
        return Err(AppPackError::validation(format!(
            "{context}: Output type '{}' cannot be collected by glob; use File or Directory",
            output.param_type
        )));
    }

    if output.glob.trim().is_empty() {
        return Err(AppPackError::validation(format!(
            "{context}: Glob pattern cannot be empty"
        )));
    }

    Ok(())
}

/// Validate a CWL identifier
///
/// # Errors
///
/// Returns a message describing the rule when the identifier is invalid
#[inline]
pub fn validate_identifier(name: &str) -> core::result::Result<(), String> {
    let regex = Regex::new(IDENTIFIER_PATTERN).map_err(|e| e.to_string())?;
    if regex.is_match(name) {
        Ok(())
    } else {
        Err(format!(
            "Invalid identifier '{name}'. Identifiers start with a letter or underscore \
            and contain only letters, digits, '_', '.' or '-'"
        ))
    }
}

/// Validate a container image reference
///
/// # Errors
///
/// Returns a message describing the rule when the reference is invalid
#[inline]
pub fn validate_image_reference(image: &str) -> core::result::Result<(), String> {
    let regex = Regex::new(IMAGE_PATTERN).map_err(|e| e.to_string())?;
    if regex.is_match(image) {
        Ok(())
    } else {
        Err(format!(
            "Invalid container image reference '{image}'. \
            Expected [registry/]repository[:tag][@digest]"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(validate_identifier("to_print").is_ok());
        assert!(validate_identifier("_hidden.v2-x").is_ok());
        assert!(validate_identifier("2fast").is_err());
        assert!(validate_identifier("has space").is_err());
        assert!(validate_identifier("").is_err());
    }

    #[test]
    fn image_references() {
        assert!(validate_image_reference("ghcr.io/maap-project/sardem-sarsen:mlucas_nasa-ogc").is_ok());
        assert!(validate_image_reference("ubuntu").is_ok());
        assert!(validate_image_reference("localhost:5000/team/tool:V1.2").is_ok());
        assert!(
            validate_image_reference(
                "ghcr.io/org/img@sha256:4bc453b53cb3d914b45f4b250294236adba2c0e09ff6f03793949e7e39fd4cc1"
            )
            .is_ok()
        );
        assert!(validate_image_reference("ghcr.io/org/img:bad tag").is_err());
        assert!(validate_image_reference("").is_err());
    }
}
