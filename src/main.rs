//! # `app-pack-generator`
//!
//! Builds CWL v1.2 process descriptions that follow the OGC application
//! package best practice from a small algorithm configuration, and registers
//! the resulting application package with an OGC API - Processes endpoint.
//!
//! ## Usage
//!
//! **Build a workflow:**
//! ```sh
//! app-pack-generator build --yaml-file algorithm_config.yml --repository-name org/repo --ref main
//! ```
//!
//! **Register the published workflow:**
//! ```sh
//! app-pack-generator deploy \
//!     --process-cwl-url https://raw.githubusercontent.com/org/repo/main/cwl_workflows/process_repo_main.cwl \
//!     --app-pack-register-endpoint https://example.org/ogc/processes
//! ```
//!
//! Validating the written file, building the container image and committing
//! the workflow are left to the surrounding CI pipeline.

use anyhow::Result;
use app_pack_generator::cli::{Args, Command};
use app_pack_generator::error::AppPackError;
use app_pack_generator::system::real::RealSystem;
use clap::Parser as _;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    let args = Args::parse();

    // Dry runs print a document on stdout, so keep the log quiet
    let log_level = if args.command.is_dry_run() {
        "error"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_target(false).with_env_filter(filter).init();

    let system = RealSystem::new();
    let result = match args.command {
        Command::Build(ref build) => app_pack_generator::run_build(build, &system).map(|_| ()),
        Command::Deploy(ref deploy) => app_pack_generator::run_deploy(deploy, &system),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            error!("{:#}", err);
            std::process::exit(
                err.downcast_ref::<AppPackError>()
                    .map_or(1, AppPackError::exit_code),
            );
        }
    }
}
