//! Fill a CWL template from an algorithm configuration
//!
//! The filler builds a new document from typed parts: the template supplies
//! the shape (ids, namespaces, extra requirement blocks) and the
//! configuration and build context supply every field that varies.

use crate::config::{AlgorithmConfig, BuildContext, InputSpec};
use crate::cwl::document::{
    CommandLineTool, CwlDocument, DefaultValue, GraphNode, InputBinding, OutputBinding, Person,
    Provenance, ToolInput, ToolOutput, Workflow, WorkflowInput,
    WorkflowOutput, WorkflowStep,
};
use crate::cwl::template::template_shape;
use crate::cwl::types::CwlType;
use crate::error::{AppPackError, Result};
use indexmap::{IndexMap, IndexSet};
use serde_yaml::Value;
use tracing::debug;

/// Minimum RAM (MiB) when the configuration does not declare one
pub const DEFAULT_RAM_MIN_MIB: u64 = 256;

/// Minimum cores when the configuration does not declare any
pub const DEFAULT_CORES_MIN: u32 = 1;

/// Output directory bound (MiB) when the configuration does not declare one
pub const DEFAULT_OUTDIR_MAX_MIB: u64 = 1024;

const SCHEMA_ORG_PREFIX: &str = "s";
const SCHEMA_ORG_NAMESPACE: &str = "https://schema.org/";

/// Produce a complete CWL document from a template, a configuration and a build context
///
/// The result depends only on the arguments, so identical inputs (including
/// the context date) serialize to identical bytes.
///
/// # Errors
///
/// Returns an error if:
/// - The template does not have the single workflow/step/tool shape
/// - Input positions collide or decrease
/// - No container image is available
/// - A workflow output does not resolve to a tool output
#[inline]
pub fn fill_template(
    template: &CwlDocument,
    config: &AlgorithmConfig,
    context: &BuildContext,
) -> Result<CwlDocument> {
    let shape = template_shape(template)?;
    let step_name = shape.step_name.to_owned();
    let positions = resolve_positions(&config.inputs)?;

    let mut workflow = shape.workflow.clone();
    let mut tool = shape.tool.clone();
    let mut step = WorkflowStep {
        run: format!("#{}", tool.id),
        inputs: IndexMap::new(),
        outputs: Vec::new(),
    };

    workflow.id.clone_from(&config.process_id);
    workflow.label = Some(config.process_id.clone());
    workflow.doc.clone_from(&config.description);
    workflow.inputs.clear();
    workflow.outputs.clear();
    tool.inputs.clear();
    tool.outputs.clear();

    for (input, position) in config.inputs.iter().zip(positions) {
        let default = input
            .default
            .as_ref()
            .map(|value| input_default(input.param_type, value));

        workflow.inputs.insert(
            input.name.clone(),
            WorkflowInput {
                doc: input.doc.clone(),
                label: input.label.clone(),
                param_type: input.param_type,
                default: default.clone(),
            },
        );
        tool.inputs.insert(
            input.name.clone(),
            ToolInput {
                param_type: input.param_type,
                input_binding: InputBinding {
                    position,
                    prefix: input_prefix(input),
                },
                default,
            },
        );
        step.inputs.insert(input.name.clone(), input.name.clone());
    }

    for output in &config.outputs {
        workflow.outputs.insert(
            output.name.clone(),
            WorkflowOutput {
                doc: output.doc.clone(),
                label: output.label.clone(),
                param_type: output.param_type,
                output_source: format!("{step_name}/{}", output.name),
            },
        );
        tool.outputs.insert(
            output.name.clone(),
            ToolOutput {
                param_type: output.param_type,
                output_binding: OutputBinding {
                    glob: output.glob.clone(),
                },
            },
        );
        step.outputs.push(output.name.clone());
    }

    workflow.steps = IndexMap::from([(step_name, step)]);

    tool.base_command = config.command.trim().to_owned();
    tool.requirements.docker.docker_pull = container_image(config, context)?;
    let resources = &mut tool.requirements.resources;
    resources.cores_min = Some(config.cores_min.unwrap_or(DEFAULT_CORES_MIN));
    resources.ram_min = Some(config.ram_min.unwrap_or(DEFAULT_RAM_MIN_MIB));
    resources.outdir_max = Some(config.outdir_max.unwrap_or(DEFAULT_OUTDIR_MAX_MIB));

    verify_output_wiring(&workflow, &tool)?;

    let mut namespaces = template.namespaces.clone();
    namespaces
        .entry(SCHEMA_ORG_PREFIX.to_owned())
        .or_insert_with(|| SCHEMA_ORG_NAMESPACE.to_owned());

    debug!(
        "Filled workflow '{}' with {} inputs and {} outputs",
        workflow.id,
        workflow.inputs.len(),
        workflow.outputs.len()
    );

    Ok(CwlDocument {
        cwl_version: template.cwl_version.clone(),
        namespaces,
        schemas: template.schemas.clone(),
        provenance: stamp_provenance(&template.provenance, config, context),
        graph: vec![
            GraphNode::Workflow(workflow),
            GraphNode::CommandLineTool(tool),
        ],
        other: template.other.clone(),
    })
}

/// Compute the command line position of every input
///
/// An input without a declared position goes right after the previous one
/// (so undeclared positions are simply 1, 2, 3, ...). Positions must strictly
/// increase in declaration order.
///
/// # Errors
///
/// Returns an input order error when two inputs share a position or a
/// declared position goes backwards
#[inline]
pub fn resolve_positions(inputs: &[InputSpec]) -> Result<Vec<u32>> {
    let mut positions = Vec::with_capacity(inputs.len());
    let mut previous: Option<(u32, &str)> = None;

    for input in inputs {
        let position = match (input.position, previous) {
            (Some(0), _) => {
                return Err(AppPackError::input_order(format!(
                    "Input '{}' declares position 0; positions start at 1",
                    input.name
                )));
            }
            (Some(declared), _) => declared,
            (None, Some((last, _))) => last.checked_add(1).ok_or_else(|| {
                AppPackError::input_order(format!(
                    "Input '{}' would be placed past the last representable position",
                    input.name
                ))
            })?,
            (None, None) => 1,
        };

        if let Some((last, last_name)) = previous {
            if position == last {
                return Err(AppPackError::input_order(format!(
                    "Inputs '{last_name}' and '{}' both bind position {position}",
                    input.name
                )));
            }
            if position < last {
                return Err(AppPackError::input_order(format!(
                    "Input '{}' binds position {position} after '{last_name}' at position {last}; \
                    positions must increase in declaration order",
                    input.name
                )));
            }
        }

        previous = Some((position, input.name.as_str()));
        positions.push(position);
    }

    Ok(positions)
}

/// Check that every workflow output is produced by the step and the tool, and
/// that every tool output is exposed by exactly one workflow output
///
/// # Errors
///
/// Returns an unresolved output error naming the first broken link
#[inline]
pub fn verify_output_wiring(workflow: &Workflow, tool: &CommandLineTool) -> Result<()> {
    let mut exposed = IndexSet::new();

    for (name, output) in &workflow.outputs {
        let unresolved = |reason: &str| AppPackError::UnresolvedOutput {
            output: name.clone(),
            source_ref: output.output_source.clone(),
            reason: reason.to_owned(),
        };

        let Some((step_name, tool_output)) = output.output_source.split_once('/') else {
            return Err(unresolved("is not of the form <step>/<output>"));
        };

        let step = workflow
            .steps
            .get(step_name)
            .ok_or_else(|| unresolved("names a step that does not exist"))?;

        if !step.outputs.iter().any(|out| out == tool_output) {
            return Err(unresolved("is not listed in the step's out"));
        }

        if !tool.outputs.contains_key(tool_output) {
            return Err(unresolved("does not match any CommandLineTool output"));
        }

        if !exposed.insert(tool_output) {
            return Err(unresolved("is already exposed by another workflow output"));
        }
    }

    if let Some(orphan) = tool.outputs.keys().find(|name| !exposed.contains(name.as_str())) {
        return Err(AppPackError::UnresolvedOutput {
            output: orphan.clone(),
            source_ref: format!("{}/{orphan}", tool.id),
            reason: "is not exposed by any workflow output".to_owned(),
        });
    }

    Ok(())
}

/// Normalize a container image reference for `dockerPull`
///
/// Registry and repository path are lowercased; the tag and digest are kept
/// as written since they are case sensitive.
#[must_use]
#[inline]
pub fn normalize_image_reference(image: &str) -> String {
    let image = image.trim();
    let (name, digest) = match image.split_once('@') {
        Some((name, digest)) => (name, Some(digest)),
        None => (image, None),
    };

    // A ':' after the last '/' starts the tag; earlier ones belong to a registry port
    let last_slash = name.rfind('/').map_or(0, |index| index + 1);
    let (path, tag) = match name[last_slash..].find(':') {
        Some(offset) => name.split_at(last_slash + offset),
        None => (name, ""),
    };

    let mut normalized = path.to_lowercase();
    normalized.push_str(tag);
    if let Some(digest) = digest {
        normalized.push('@');
        normalized.push_str(digest);
    }
    normalized
}

/// Replace anything but ASCII letters, digits and spaces with `_`
#[must_use]
#[inline]
pub fn sanitize_version(version: &str) -> String {
    version
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn container_image(config: &AlgorithmConfig, context: &BuildContext) -> Result<String> {
    context
        .docker_image
        .as_deref()
        .or(config.image.as_deref())
        .filter(|image| !image.trim().is_empty())
        .map(normalize_image_reference)
        .ok_or_else(|| {
            AppPackError::validation(
                "Field 'docker_image': A container image reference is required",
            )
        })
}

fn input_prefix(input: &InputSpec) -> Option<String> {
    match input.prefix.as_deref() {
        None => Some(format!("--{}", input.name)),
        Some("") => None,
        Some(prefix) => Some(prefix.to_owned()),
    }
}

fn input_default(param_type: CwlType, value: &Value) -> DefaultValue {
    match value.as_str() {
        Some(path) if param_type.is_path_like() && !param_type.array => DefaultValue::Location {
            class: param_type.base.as_str().to_owned(),
            path: path.to_owned(),
        },
        _ => DefaultValue::Literal(value.clone()),
    }
}

fn stamp_provenance(
    template: &Provenance,
    config: &AlgorithmConfig,
    context: &BuildContext,
) -> Provenance {
    let mut provenance = template.clone();

    if let Some(author) = config.author.as_ref() {
        provenance.authors = vec![Person::named(author.clone())];
    }
    if let Some(contributor) = config.contributor.as_ref() {
        provenance.contributors = vec![Person::named(contributor.clone())];
    }

    provenance.citation = config.citation.clone().or(provenance.citation);
    provenance.code_repository = config
        .code_repository
        .clone()
        .or_else(|| context.repository_url.clone())
        .or(provenance.code_repository);
    provenance.commit_hash = context.commit_hash.clone();
    provenance.date_created = Some(context.date);
    provenance.keywords = config.keywords.clone().or(provenance.keywords);
    provenance.license = config.license.clone().or(provenance.license);
    provenance.release_notes = config.release_notes.clone().or(provenance.release_notes);
    provenance.software_version = Some(context.software_version.clone());
    provenance.version = Some(sanitize_version(
        config.version.as_deref().unwrap_or(&context.reference),
    ));

    provenance
}
