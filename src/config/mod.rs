//! Configuration management module
//!
//! Handles algorithm configuration parsing, JSON schema validation, semantic
//! validation, and the explicit build context used for provenance

pub mod context;
pub mod schema;
pub mod validation;
pub mod yaml;

use crate::cwl::types::CwlType;
use crate::error::Result;
use crate::system::System;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

pub use context::BuildContext;

/// Parsed algorithm configuration (`algorithm_config.yml`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmConfig {
    /// Process identifier, used as the workflow id and label
    #[serde(rename = "algorithm_name", alias = "process_id")]
    pub process_id: String,

    #[serde(
        rename = "algorithm_description",
        alias = "description",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,

    #[serde(
        rename = "algorithm_version",
        alias = "version",
        default,
        deserialize_with = "scalar_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,

    /// Container image reference; may be supplied by the build context instead
    #[serde(
        rename = "docker_image",
        alias = "image",
        alias = "container_image",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<String>,

    /// Base command run inside the container
    #[serde(rename = "run_command", alias = "command", alias = "base_command")]
    pub command: String,

    #[serde(default)]
    pub inputs: Vec<InputSpec>,

    #[serde(default)]
    pub outputs: Vec<OutputSpec>,

    /// Minimum RAM in MiB
    #[serde(alias = "memory", default, skip_serializing_if = "Option::is_none")]
    pub ram_min: Option<u64>,

    #[serde(alias = "cores", default, skip_serializing_if = "Option::is_none")]
    pub cores_min: Option<u32>,

    /// Maximum output directory size in MiB
    #[serde(alias = "disk", default, skip_serializing_if = "Option::is_none")]
    pub outdir_max: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_repository: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_notes: Option<String>,
}

/// A declared algorithm input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    pub name: String,

    #[serde(rename = "type")]
    pub param_type: CwlType,

    #[serde(alias = "description", default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Explicit command line position; defaults to the 1-based declaration index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,

    /// Flag preceding the value; defaults to `--<name>`, empty means positional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

/// A declared algorithm output, collected by glob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub name: String,

    #[serde(rename = "type")]
    pub param_type: CwlType,

    #[serde(alias = "description", default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default = "default_glob")]
    pub glob: String,
}

/// Glob used by outputs that do not declare one
pub const DEFAULT_OUTPUT_GLOB: &str = "./output*";

fn default_glob() -> String {
    DEFAULT_OUTPUT_GLOB.to_owned()
}

/// Accept versions written as YAML numbers (`1.2`) as well as strings
fn scalar_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> core::result::Result<Option<String>, D::Error> {
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(text)) => Ok(Some(text)),
        Some(serde_json::Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}

impl AlgorithmConfig {
    /// Load, parse and validate an algorithm configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, malformed or invalid
    #[inline]
    pub fn load_from_file(system: &dyn System, path: &str) -> Result<Self> {
        yaml::load_config(system, path)
    }

    /// Validate required fields and naming rules
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field
    #[inline]
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Optional keys left unset, named as in `algorithm_config.yml`
    #[must_use]
    pub fn unset_optional_keys(&self) -> Vec<&'static str> {
        [
            ("algorithm_description", self.description.is_none()),
            ("algorithm_version", self.version.is_none()),
            ("docker_image", self.image.is_none()),
            ("ram_min", self.ram_min.is_none()),
            ("cores_min", self.cores_min.is_none()),
            ("outdir_max", self.outdir_max.is_none()),
            ("author", self.author.is_none()),
            ("contributor", self.contributor.is_none()),
            ("citation", self.citation.is_none()),
            ("code_repository", self.code_repository.is_none()),
            ("keywords", self.keywords.is_none()),
            ("license", self.license.is_none()),
            ("release_notes", self.release_notes.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, unset)| unset.then_some(key))
        .collect()
    }

    /// Iterate over every declared parameter name, inputs first
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.inputs
            .iter()
            .map(|input| input.name.as_str())
            .chain(self.outputs.iter().map(|output| output.name.as_str()))
    }
}
