//! `app-pack-generator` - build OGC application package CWL workflows
//!
//! This library turns a small algorithm configuration into a CWL v1.2
//! process description (one `Workflow` running one `CommandLineTool`),
//! writes it under `cwl_workflows/`, and can register an OGC application
//! package that points at the published file.

pub mod cli;
pub mod config;
pub mod cwl;
pub mod error;
pub mod operations;
pub mod package;
pub mod system;
pub mod utils;

use anyhow::{Context as _, Result};
use cli::{BuildArgs, DeployArgs};
use config::{AlgorithmConfig, BuildContext};
use cwl::CwlDocument;
use operations::{DeployClient, WorkflowWriter, fill_template};
use package::{AppPackageDocument, PackageMetadata};
use std::path::PathBuf;
use std::time::Duration;
use system::System;
use tracing::{debug, info};
use utils::path::workflow_file_name;

/// Load a configuration and a template and fill the template
///
/// `docker_image` in the context replaces the configured image before the
/// configuration is validated.
///
/// # Errors
///
/// Returns an error if the configuration or template cannot be loaded, the
/// configuration is invalid, or the fill contract is violated
#[inline]
pub fn generate_workflow(
    system: &dyn System,
    config_path: &str,
    template_path: Option<&str>,
    context: &BuildContext,
) -> error::Result<CwlDocument> {
    let mut config = config::yaml::read_config(system, config_path)?;
    if let Some(image) = context.docker_image.as_ref() {
        debug!("Using container image from build context: {}", image);
        config.image = Some(image.clone());
    }
    config.validate()?;

    let template = cwl::load_template(system, template_path)?;
    fill_template(&template, &config, context)
}

/// Run the `build` command
///
/// Returns the path of the written workflow, or `None` for a dry run (the
/// document is printed to stdout instead).
///
/// # Errors
///
/// Returns an error if generation or writing fails
pub fn run_build(args: &BuildArgs, system: &dyn System) -> Result<Option<PathBuf>> {
    let date = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let mut context = BuildContext::new(args.repository_name.clone(), args.reference.clone(), date)
        .with_software_version(args.software_version.clone());
    if let Some(url) = args.repository_url.as_ref() {
        context = context.with_repository_url(url.clone());
    }
    if let Some(hash) = args.commit_hash.as_ref() {
        context = context.with_commit_hash(hash.clone());
    }
    if let Some(image) = args.docker_image.as_ref() {
        context = context.with_docker_image(image.clone());
    }

    info!("Building CWL workflow...");
    info!("  Input file: {}", args.yaml_file);
    info!("  Workflow output directory: {}", args.workflow_output_dir);
    info!(
        "  CWL template file: {}",
        args.cwl_template_file.as_deref().unwrap_or("<embedded v1.2>")
    );

    let document = generate_workflow(
        system,
        &args.yaml_file,
        args.cwl_template_file.as_deref(),
        &context,
    )?;

    if args.dry_run {
        let rendered = WorkflowWriter::render(&document)?;
        // Output to stdout (not using logging)
        print!("{rendered}");
        return Ok(None);
    }

    let file_name = args
        .workflow_file_name
        .clone()
        .unwrap_or_else(|| workflow_file_name(&context.repository_name, &context.reference));

    let writer = WorkflowWriter::new(system, &args.workflow_output_dir);
    let path = writer
        .write(&document, &file_name)
        .context("Workflow file was not written")?;
    Ok(Some(path))
}

/// Run the `deploy` command
///
/// # Errors
///
/// Returns an error if the template or configuration cannot be loaded or the
/// registration fails
pub fn run_deploy(args: &DeployArgs, system: &dyn System) -> Result<()> {
    let explicit = PackageMetadata {
        id: None,
        title: args.title.clone(),
        description: args.description.clone(),
        version: args.package_version.clone(),
    };
    let metadata = match args.yaml_file.as_deref() {
        Some(path) => explicit.or(PackageMetadata::from_config(
            &AlgorithmConfig::load_from_file(system, path)?,
        )),
        None => explicit,
    };

    let template = AppPackageDocument::load_template(system, args.app_pack_template_file.as_deref())?;
    let package = template.fill(&args.process_cwl_url, &metadata)?;

    if args.dry_run {
        // Output to stdout (not using logging)
        println!("{}", package.to_json()?);
        return Ok(());
    }

    let mut client = DeployClient::new(
        &args.app_pack_register_endpoint,
        Duration::from_secs(args.timeout_secs),
    )?
    .with_replace_existing(args.replace_existing)
    .with_allow_anonymous(args.allow_anonymous);
    if let Some(token) = args.token.as_ref() {
        client = client.with_token(token.clone());
    }

    let outcome = client.deploy(&package)?;
    info!(
        "Deployed {} (HTTP {}): {:?}",
        args.process_cwl_url, outcome.status, outcome.action
    );
    if !outcome.body.is_empty() {
        info!("Response: {}", outcome.body);
    }

    Ok(())
}
