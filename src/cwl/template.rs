//! CWL template loading

use crate::cwl::document::{CommandLineTool, CwlDocument, GraphNode, Workflow};
use crate::error::{AppPackError, Result};
use crate::system::System;
use std::path::Path;
use tracing::debug;

/// Template shipped with the tool, compliant with CWL v1.2
pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/process.v1_2.cwl");

/// Load a CWL template, falling back to the embedded default
///
/// # Errors
///
/// Returns a template error if the file is missing or is not a usable template
#[inline]
pub fn load_template(system: &dyn System, path: Option<&str>) -> Result<CwlDocument> {
    let Some(path) = path else {
        debug!("Using embedded CWL v1.2 template");
        return CwlDocument::from_yaml_str(DEFAULT_TEMPLATE);
    };

    let path_obj = Path::new(path);
    if !system.is_file(path_obj) {
        return Err(AppPackError::template(format!(
            "CWL template file not found: {path}"
        )));
    }

    let content = system.read_to_string(path_obj).map_err(|e| {
        AppPackError::template(format!("Failed to read CWL template {path}: {e}"))
    })?;

    CwlDocument::from_yaml_str(&content).map_err(|e| match e {
        AppPackError::Template { message } => AppPackError::template(format!("{path}: {message}")),
        other => other,
    })
}

/// The single-step shape every template must have
#[derive(Debug)]
pub struct TemplateShape<'doc> {
    pub workflow: &'doc Workflow,
    pub step_name: &'doc str,
    pub tool: &'doc CommandLineTool,
}

/// Check that a template holds one workflow whose only step runs its only tool
///
/// # Errors
///
/// Returns a template error describing the first structural problem found
#[inline]
pub fn template_shape(template: &CwlDocument) -> Result<TemplateShape<'_>> {
    let workflows: Vec<&Workflow> = template
        .graph
        .iter()
        .filter_map(|node| match node {
            GraphNode::Workflow(workflow) => Some(workflow),
            GraphNode::CommandLineTool(_) => None,
        })
        .collect();
    let tools: Vec<&CommandLineTool> = template
        .graph
        .iter()
        .filter_map(|node| match node {
            GraphNode::CommandLineTool(tool) => Some(tool),
            GraphNode::Workflow(_) => None,
        })
        .collect();

    let (&[workflow], &[tool]) = (workflows.as_slice(), tools.as_slice()) else {
        return Err(AppPackError::template(format!(
            "Template $graph must contain exactly one Workflow and one CommandLineTool \
            (found {} and {})",
            workflows.len(),
            tools.len()
        )));
    };

    let mut steps = workflow.steps.iter();
    let (Some((step_name, step)), None) = (steps.next(), steps.next()) else {
        return Err(AppPackError::template(format!(
            "Workflow '{}' must declare exactly one step (found {}); multi-step workflows are not supported",
            workflow.id,
            workflow.steps.len()
        )));
    };

    let expected_run = format!("#{}", tool.id);
    if step.run != expected_run {
        return Err(AppPackError::template(format!(
            "Step '{step_name}' runs '{}' but the CommandLineTool id is '{}' (expected run: {expected_run})",
            step.run, tool.id
        )));
    }

    Ok(TemplateShape {
        workflow,
        step_name,
        tool,
    })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;
    use crate::system::MockSystem;

    #[test]
    fn embedded_template_has_single_step_shape() {
        let system = MockSystem::new();
        let template = load_template(&system, None).unwrap();
        let shape = template_shape(&template).unwrap();
        assert_eq!(shape.step_name, "process");
        assert_eq!(shape.tool.id, "process");
        assert_eq!(template.cwl_version, "v1.2");
    }

    #[test]
    fn missing_template_file() {
        let system = MockSystem::new();
        let err = load_template(&system, Some("/templates/missing.cwl")).unwrap_err();
        assert!(err.to_string().contains("CWL template file not found"));
    }

    #[test]
    fn rejects_multi_step_templates() {
        let content = DEFAULT_TEMPLATE.replace(
            "        out: []\n",
            "        out: []\n      second:\n        run: \"#process\"\n        in: {}\n        out: []\n",
        );
        let template = CwlDocument::from_yaml_str(&content).unwrap();
        let err = template_shape(&template).unwrap_err();
        assert!(err.to_string().contains("exactly one step"));
    }

    #[test]
    fn rejects_dangling_run_reference() {
        let content = DEFAULT_TEMPLATE.replace("run: \"#process\"", "run: \"#elsewhere\"");
        let template = CwlDocument::from_yaml_str(&content).unwrap();
        let err = template_shape(&template).unwrap_err();
        assert!(matches!(err, AppPackError::Template { .. }));
    }
}
