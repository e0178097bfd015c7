//! Path and file name utilities

use crate::error::{AppPackError, Result};

/// Replace path separators so a value can be embedded in a single file name
#[must_use]
pub fn flatten_separators(value: &str) -> String {
    value.replace(['/', '\\'], "_")
}

/// File name of the generated workflow: `process_<repo-name>_<ref>.cwl`
///
/// Only the last segment of an `owner/name` repository is used; separators
/// inside the ref (`feature/x`, `refs/heads/main`) become underscores.
#[must_use]
pub fn workflow_file_name(repository_name: &str, reference: &str) -> String {
    let trimmed = repository_name.trim_end_matches(['/', '\\']);
    let repo = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);
    format!("process_{repo}_{}.cwl", flatten_separators(reference))
}

/// Validate a caller supplied workflow file name
///
/// # Errors
///
/// Returns a write error if the name is empty, contains a separator, or
/// would refer to a parent directory
pub fn validate_file_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppPackError::write(name, "Workflow file name cannot be empty"));
    }

    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(AppPackError::write(
            name,
            "Workflow file name must be a plain file name without directories",
        ));
    }

    Ok(())
}
