//! JSON Schema validation for algorithm configurations

use crate::error::{AppPackError, Result};
use jsonschema::{Draft, Validator};
use serde_json::Value;

/// Get the embedded JSON schema for algorithm configurations
///
/// # Errors
///
/// Returns an error if the embedded schema cannot be parsed or compiled
pub fn get_schema() -> Result<Validator> {
    let schema = schema_document()?;

    jsonschema::options()
        .with_draft(Draft::Draft7)
        .build(&schema)
        .map_err(|e| AppPackError::validation(format!("Failed to compile JSON schema: {e}")))
}

fn schema_document() -> Result<Value> {
    let schema_str = include_str!("../../docs/algorithm_config.schema.json");
    serde_json::from_str(schema_str).map_err(|e| {
        AppPackError::validation(format!("Failed to parse embedded JSON schema: {e}"))
    })
}

/// Keys of `config` (top level and inside `inputs`/`outputs` entries) that
/// the schema does not declare, as JSON pointers
///
/// # Errors
///
/// Returns an error if the embedded schema cannot be parsed
pub fn unknown_keys(config: &Value) -> Result<Vec<String>> {
    let schema = schema_document()?;
    let mut unknown = undeclared(config, &schema["properties"], "");

    for section in ["inputs", "outputs"] {
        let declared = &schema["properties"][section]["items"]["properties"];
        let entries = config.get(section).and_then(Value::as_array);
        for (index, entry) in entries.into_iter().flatten().enumerate() {
            unknown.extend(undeclared(entry, declared, &format!("/{section}/{index}")));
        }
    }

    Ok(unknown)
}

fn undeclared(value: &Value, declared: &Value, prefix: &str) -> Vec<String> {
    value
        .as_object()
        .into_iter()
        .flat_map(|object| object.keys())
        .filter(|key| declared.get(key.as_str()).is_none())
        .map(|key| format!("{prefix}/{key}"))
        .collect()
}

/// Validate a configuration value against the schema
///
/// # Errors
///
/// Returns a validation error listing every violation with its location
pub fn validate_against_schema(config: &Value) -> Result<()> {
    let schema = get_schema()?;

    let error_messages: Vec<String> = schema
        .iter_errors(config)
        .map(|e| {
            let location = e.instance_path.to_string();
            let location = if location.is_empty() {
                "/".to_owned()
            } else {
                location
            };
            format!("  - Path '{location}': {e}")
        })
        .collect();

    if !error_messages.is_empty() {
        return Err(AppPackError::validation(format!(
            "algorithm configuration does not match the schema:\n{}",
            error_messages.join("\n")
        )));
    }

    Ok(())
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn embedded_schema_compiles() {
        get_schema().unwrap();
    }

    #[test]
    fn accepts_minimal_document() {
        let config = json!({
            "algorithm_name": "sample_print",
            "run_command": "/run.sh",
            "inputs": [],
            "outputs": []
        });
        validate_against_schema(&config).unwrap();
    }

    #[test]
    fn reports_path_of_bad_type() {
        let config = json!({
            "algorithm_name": "sample_print",
            "run_command": "/run.sh",
            "inputs": [{"name": "to_print", "type": "text"}],
            "outputs": []
        });
        let message = validate_against_schema(&config).unwrap_err().to_string();
        assert!(message.contains("/inputs/0/type"), "{message}");
    }

    #[test]
    fn finds_misspelled_keys() {
        let config = json!({
            "algorithm_name": "sample_print",
            "ram_mn": 512,
            "inputs": [{"name": "to_print", "type": "string", "defualt": "hi", "default": "hi"}],
            "outputs": [{"name": "out", "type": "Directory", "glob": "./out"}]
        });
        assert_eq!(
            unknown_keys(&config).unwrap(),
            vec!["/ram_mn".to_owned(), "/inputs/0/defualt".to_owned()]
        );
    }

    #[test]
    fn reports_missing_sections() {
        let config = json!({"algorithm_name": "sample_print", "run_command": "/run.sh"});
        let message = validate_against_schema(&config).unwrap_err().to_string();
        assert!(message.contains("inputs"));
        assert!(message.contains("outputs"));
    }
}
