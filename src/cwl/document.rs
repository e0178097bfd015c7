//! Typed model of a packed CWL v1.2 document
//!
//! The generator never patches YAML trees by key path. Templates are parsed
//! into these types and the filler assigns fields on them, so a document
//! that serializes is structurally complete.

use crate::cwl::types::CwlType;
use crate::error::{AppPackError, Result};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Packed CWL document: metadata plus a `$graph` of process nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CwlDocument {
    #[serde(rename = "cwlVersion")]
    pub cwl_version: String,

    #[serde(
        rename = "$namespaces",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub namespaces: IndexMap<String, String>,

    #[serde(rename = "$schemas", default, skip_serializing_if = "Vec::is_empty")]
    pub schemas: Vec<String>,

    /// schema.org provenance block
    #[serde(flatten)]
    pub provenance: Provenance,

    #[serde(rename = "$graph")]
    pub graph: Vec<GraphNode>,

    /// Other top-level template keys (extra `s:` metadata and the like)
    #[serde(flatten)]
    pub other: IndexMap<String, Value>,
}

/// schema.org metadata recommended by the OGC application package best practice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Provenance {
    #[serde(rename = "s:author", default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Person>,

    #[serde(
        rename = "s:contributor",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub contributors: Vec<Person>,

    #[serde(rename = "s:citation", skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,

    #[serde(rename = "s:codeRepository", skip_serializing_if = "Option::is_none")]
    pub code_repository: Option<String>,

    #[serde(rename = "s:commitHash", skip_serializing_if = "Option::is_none")]
    pub commit_hash: Option<String>,

    #[serde(rename = "s:dateCreated", skip_serializing_if = "Option::is_none")]
    pub date_created: Option<NaiveDate>,

    #[serde(rename = "s:keywords", skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,

    #[serde(rename = "s:license", skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(rename = "s:releaseNotes", skip_serializing_if = "Option::is_none")]
    pub release_notes: Option<String>,

    #[serde(rename = "s:softwareVersion", skip_serializing_if = "Option::is_none")]
    pub software_version: Option<String>,

    #[serde(rename = "s:version", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A `s:Person` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default = "person_class")]
    pub class: String,

    #[serde(rename = "s:name")]
    pub name: String,
}

impl Person {
    #[must_use]
    #[inline]
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self {
            class: person_class(),
            name: name.into(),
        }
    }
}

fn person_class() -> String {
    "s:Person".to_owned()
}

/// A process node in `$graph`, discriminated by its `class`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class")]
pub enum GraphNode {
    Workflow(Workflow),
    CommandLineTool(CommandLineTool),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub requirements: IndexMap<String, Value>,

    #[serde(default)]
    pub inputs: IndexMap<String, WorkflowInput>,

    #[serde(default)]
    pub outputs: IndexMap<String, WorkflowOutput>,

    #[serde(default)]
    pub steps: IndexMap<String, WorkflowStep>,

    /// `hints` and any other workflow keys carried over from the template
    #[serde(flatten)]
    pub other: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(rename = "type")]
    pub param_type: CwlType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(rename = "type")]
    pub param_type: CwlType,

    /// `<step>/<tool output>` reference
    #[serde(rename = "outputSource")]
    pub output_source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// `#<tool id>` reference into `$graph`
    pub run: String,

    #[serde(rename = "in", default)]
    pub inputs: IndexMap<String, String>,

    #[serde(rename = "out", default)]
    pub outputs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandLineTool {
    pub id: String,

    #[serde(default)]
    pub requirements: ToolRequirements,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub hints: IndexMap<String, Value>,

    #[serde(rename = "baseCommand", default)]
    pub base_command: String,

    #[serde(default)]
    pub inputs: IndexMap<String, ToolInput>,

    #[serde(default)]
    pub outputs: IndexMap<String, ToolOutput>,

    /// `arguments`, `stdout`, `successCodes` and other keys carried over from the template
    #[serde(flatten)]
    pub other: IndexMap<String, Value>,
}

/// Tool requirements in map form; blocks other than docker/resources pass through
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolRequirements {
    #[serde(rename = "DockerRequirement", default)]
    pub docker: DockerRequirement,

    #[serde(rename = "ResourceRequirement", default)]
    pub resources: ResourceRequirement,

    #[serde(flatten)]
    pub other: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerRequirement {
    #[serde(rename = "dockerPull", default)]
    pub docker_pull: String,
}

/// Resource bounds; memory and disk are in mebibytes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequirement {
    #[serde(rename = "coresMin", default, skip_serializing_if = "Option::is_none")]
    pub cores_min: Option<u32>,

    #[serde(rename = "ramMin", default, skip_serializing_if = "Option::is_none")]
    pub ram_min: Option<u64>,

    #[serde(rename = "outdirMax", default, skip_serializing_if = "Option::is_none")]
    pub outdir_max: Option<u64>,

    /// Bounds the configuration does not set (`coresMax`, `ramMax`, `tmpdirMin`, ...)
    #[serde(flatten)]
    pub other: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInput {
    #[serde(rename = "type")]
    pub param_type: CwlType,

    #[serde(rename = "inputBinding")]
    pub input_binding: InputBinding,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputBinding {
    pub position: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    #[serde(rename = "type")]
    pub param_type: CwlType,

    #[serde(rename = "outputBinding")]
    pub output_binding: OutputBinding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputBinding {
    pub glob: String,
}

/// Default value of an input parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    /// `File`/`Directory` default written as a location object
    Location { class: String, path: String },
    Literal(Value),
}

impl CwlDocument {
    /// Parse a CWL document (or template) from YAML text
    ///
    /// # Errors
    ///
    /// Returns a template error if the text is not a packed CWL document
    #[inline]
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| AppPackError::template(format!("Invalid CWL document: {e}")))
    }

    /// Serialize the document as YAML
    ///
    /// # Errors
    ///
    /// Returns a template error if serialization fails
    #[inline]
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| AppPackError::template(format!("Failed to serialize CWL document: {e}")))
    }

    /// The first `Workflow` node in `$graph`
    #[must_use]
    #[inline]
    pub fn workflow(&self) -> Option<&Workflow> {
        self.graph.iter().find_map(|node| match node {
            GraphNode::Workflow(workflow) => Some(workflow),
            GraphNode::CommandLineTool(_) => None,
        })
    }

    /// The first `CommandLineTool` node in `$graph`
    #[must_use]
    #[inline]
    pub fn tool(&self) -> Option<&CommandLineTool> {
        self.graph.iter().find_map(|node| match node {
            GraphNode::CommandLineTool(tool) => Some(tool),
            GraphNode::Workflow(_) => None,
        })
    }
}
