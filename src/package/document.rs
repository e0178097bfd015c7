//! Application package document and template filling

use crate::config::AlgorithmConfig;
use crate::error::{AppPackError, Result};
use crate::system::System;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Template shipped with the tool (`ogcapppkg` schema of OGC API - Processes Part 2)
pub const DEFAULT_APP_PACKAGE_TEMPLATE: &str = include_str!("../../templates/ogcapppkg.yml");

/// Media type of a CWL execution unit
pub const CWL_MEDIA_TYPE: &str = "application/cwl";

/// Registration body: process description plus a reference to the CWL file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppPackageDocument {
    #[serde(default)]
    pub process_description: ProcessDescription,

    #[serde(default)]
    pub execution_unit: ExecutionUnit,

    /// Any other template keys, sent unchanged
    #[serde(flatten)]
    pub other: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(flatten)]
    pub other: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionUnit {
    #[serde(default)]
    pub href: String,

    #[serde(rename = "type", default = "cwl_media_type")]
    pub media_type: String,

    #[serde(flatten)]
    pub other: IndexMap<String, Value>,
}

impl Default for ExecutionUnit {
    fn default() -> Self {
        Self {
            href: String::new(),
            media_type: cwl_media_type(),
            other: IndexMap::new(),
        }
    }
}

fn cwl_media_type() -> String {
    CWL_MEDIA_TYPE.to_owned()
}

/// Package level metadata placed in the process description
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMetadata {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
}

impl PackageMetadata {
    /// Metadata derived from an algorithm configuration
    #[must_use]
    #[inline]
    pub fn from_config(config: &AlgorithmConfig) -> Self {
        Self {
            id: Some(config.process_id.clone()),
            title: Some(config.process_id.clone()),
            description: config.description.clone(),
            version: config.version.clone(),
        }
    }

    /// Fill unset fields from `fallback`
    #[must_use]
    #[inline]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            id: self.id.or(fallback.id),
            title: self.title.or(fallback.title),
            description: self.description.or(fallback.description),
            version: self.version.or(fallback.version),
        }
    }
}

impl AppPackageDocument {
    /// Parse an application package template from YAML (or JSON) text
    ///
    /// # Errors
    ///
    /// Returns a template error if the text does not describe an application package
    #[inline]
    pub fn from_template_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            AppPackError::template(format!("Invalid application package template: {e}"))
        })
    }

    /// Load an application package template, falling back to the embedded default
    ///
    /// # Errors
    ///
    /// Returns a template error if the file is missing or malformed
    #[inline]
    pub fn load_template(system: &dyn System, path: Option<&str>) -> Result<Self> {
        let Some(path) = path else {
            debug!("Using embedded application package template");
            return Self::from_template_str(DEFAULT_APP_PACKAGE_TEMPLATE);
        };

        let path_obj = Path::new(path);
        if !system.is_file(path_obj) {
            return Err(AppPackError::template(format!(
                "Application package template file not found: {path}"
            )));
        }

        let content = system.read_to_string(path_obj).map_err(|e| {
            AppPackError::template(format!(
                "Failed to read application package template {path}: {e}"
            ))
        })?;

        Self::from_template_str(&content)
    }

    /// Produce the registration document for the CWL published at `cwl_url`
    ///
    /// Metadata values win over template values; empty template placeholders
    /// without a metadata value are dropped.
    ///
    /// # Errors
    ///
    /// Returns a template error if `cwl_url` is empty
    #[inline]
    pub fn fill(&self, cwl_url: &str, metadata: &PackageMetadata) -> Result<Self> {
        let cwl_url = cwl_url.trim();
        if cwl_url.is_empty() {
            return Err(AppPackError::template(
                "The process CWL URL cannot be empty",
            ));
        }

        let mut package = self.clone();
        package.execution_unit.href = cwl_url.to_owned();
        if package.execution_unit.media_type.trim().is_empty() {
            package.execution_unit.media_type = cwl_media_type();
        }

        let description = &mut package.process_description;
        description.id = pick(metadata.id.as_ref(), description.id.take());
        description.title = pick(metadata.title.as_ref(), description.title.take());
        description.description =
            pick(metadata.description.as_ref(), description.description.take());
        description.version = pick(metadata.version.as_ref(), description.version.take());

        Ok(package)
    }

    /// JSON request body
    ///
    /// # Errors
    ///
    /// Returns a template error if serialization fails
    #[inline]
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            AppPackError::template(format!("Failed to serialize application package: {e}"))
        })
    }
}

fn pick(preferred: Option<&String>, template: Option<String>) -> Option<String> {
    preferred
        .cloned()
        .or(template)
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;
    use crate::system::MockSystem;

    const URL: &str =
        "https://raw.githubusercontent.com/org/repo/main/cwl_workflows/process_repo_main.cwl";

    #[test]
    fn embedded_template_fills_href_and_metadata() {
        let template = AppPackageDocument::load_template(&MockSystem::new(), None).unwrap();
        let metadata = PackageMetadata {
            id: Some("sample_print".to_owned()),
            title: Some("Sample print".to_owned()),
            description: None,
            version: Some("main".to_owned()),
        };

        let package = template.fill(URL, &metadata).unwrap();
        assert_eq!(package.execution_unit.href, URL);
        assert_eq!(package.execution_unit.media_type, CWL_MEDIA_TYPE);
        assert_eq!(package.process_description.title.as_deref(), Some("Sample print"));
        assert_eq!(package.process_description.description, None);
        assert!(package.process_description.other.contains_key("jobControlOptions"));

        let json: Value = serde_json::from_str(&package.to_json().unwrap()).unwrap();
        assert_eq!(json["executionUnit"]["href"], URL);
        assert_eq!(json["processDescription"]["version"], "main");
        assert!(json["processDescription"].get("description").is_none());
    }

    #[test]
    fn template_values_survive_without_metadata() {
        let template = AppPackageDocument::from_template_str(
            "processDescription:\n  title: Fixed title\n  keywords: [sar]\nexecutionUnit:\n  href: placeholder\n",
        )
        .unwrap();

        let package = template.fill(URL, &PackageMetadata::default()).unwrap();
        assert_eq!(package.process_description.title.as_deref(), Some("Fixed title"));
        assert_eq!(package.execution_unit.href, URL);
        assert_eq!(package.execution_unit.media_type, CWL_MEDIA_TYPE);
    }

    #[test]
    fn empty_url_is_rejected() {
        let template = AppPackageDocument::from_template_str(DEFAULT_APP_PACKAGE_TEMPLATE).unwrap();
        assert!(template.fill("  ", &PackageMetadata::default()).is_err());
    }

    #[test]
    fn missing_template_file() {
        let err = AppPackageDocument::load_template(&MockSystem::new(), Some("/nope.yml"))
            .unwrap_err();
        assert!(matches!(err, AppPackError::Template { .. }));
    }

    #[test]
    fn metadata_fallback() {
        let explicit = PackageMetadata {
            title: Some("Explicit".to_owned()),
            ..PackageMetadata::default()
        };
        let derived = PackageMetadata {
            id: Some("algo".to_owned()),
            title: Some("algo".to_owned()),
            ..PackageMetadata::default()
        };
        let merged = explicit.or(derived);
        assert_eq!(merged.title.as_deref(), Some("Explicit"));
        assert_eq!(merged.id.as_deref(), Some("algo"));
    }
}
