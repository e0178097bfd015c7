//! Custom error types with exit codes

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for the generator's core operations
pub type Result<T, E = AppPackError> = core::result::Result<T, E>;

/// Main error type for application package generation
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppPackError {
    /// The algorithm configuration file does not exist
    #[error("Configuration file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// The algorithm configuration is not well-formed YAML
    #[error("Failed to parse configuration file {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    /// The algorithm configuration is missing fields or breaks a rule
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    /// A CWL or application package template is missing or malformed
    #[error("Template error: {message}")]
    Template { message: String },

    /// Input positions collide or go backwards
    #[error("Input order error: {message}")]
    InputOrder { message: String },

    /// A workflow output is not produced by the command line tool
    #[error("Unresolved output '{output}': outputSource '{source_ref}' {reason}")]
    UnresolvedOutput {
        output: String,
        source_ref: String,
        reason: String,
    },

    /// The workflow file could not be written
    #[error("Failed to write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    /// The registration request failed or was rejected
    #[error("Deploy error: {}", describe_deploy_failure(*status, body))]
    Deploy { status: Option<u16>, body: String },
}

fn describe_deploy_failure(status: Option<u16>, body: &str) -> String {
    match status {
        Some(code) if body.is_empty() => format!("HTTP {code}"),
        Some(code) => format!("HTTP {code}: {body}"),
        None => body.to_owned(),
    }
}

impl AppPackError {
    /// Get the appropriate exit code for this error type
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        match *self {
            Self::ConfigNotFound { .. }
            | Self::ConfigParse { .. }
            | Self::ConfigValidation { .. } => 1,
            Self::Template { .. } => 2,
            Self::InputOrder { .. } | Self::UnresolvedOutput { .. } => 3,
            Self::Write { .. } => 4,
            Self::Deploy { .. } => 5,
        }
    }

    /// Create a configuration validation error
    #[inline]
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create a template error
    #[inline]
    pub fn template<S: Into<String>>(message: S) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Create an input order error
    #[inline]
    pub fn input_order<S: Into<String>>(message: S) -> Self {
        Self::InputOrder {
            message: message.into(),
        }
    }

    /// Create a write error for the given path
    #[inline]
    pub fn write<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::Write {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a deploy error from a network failure (no HTTP status)
    #[inline]
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Deploy {
            status: None,
            body: message.into(),
        }
    }

    /// HTTP status carried by a deploy error, if any
    #[must_use]
    #[inline]
    pub const fn status(&self) -> Option<u16> {
        match *self {
            Self::Deploy { status, .. } => status,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_group_by_stage() {
        assert_eq!(AppPackError::validation("x").exit_code(), 1);
        assert_eq!(AppPackError::template("x").exit_code(), 2);
        assert_eq!(AppPackError::input_order("x").exit_code(), 3);
        assert_eq!(AppPackError::write("/tmp/x", "denied").exit_code(), 4);
        assert_eq!(AppPackError::network("refused").exit_code(), 5);
    }

    #[test]
    fn deploy_error_mentions_status_and_body() {
        let err = AppPackError::Deploy {
            status: Some(404),
            body: "no such endpoint".to_owned(),
        };
        let message = err.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("no such endpoint"));
        assert_eq!(err.status(), Some(404));
    }
}
