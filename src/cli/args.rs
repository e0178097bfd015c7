use crate::operations::{DEFAULT_OUTPUT_DIR, DEFAULT_TIMEOUT};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Command-line arguments for app-pack-generator
#[derive(Parser, Debug, Clone)]
#[command(name = "app-pack-generator")]
#[command(
    about = "A CLI tool for building OGC application package CWL workflows from algorithm configurations"
)]
#[command(long_about = None)]
#[command(version)]
pub struct Args {
    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build a CWL workflow file from an algorithm configuration
    Build(BuildArgs),

    /// Register an application package that references a published CWL file
    Deploy(DeployArgs),
}

impl Command {
    /// Whether the command prints a document instead of acting on it
    #[must_use]
    #[inline]
    pub const fn is_dry_run(&self) -> bool {
        match *self {
            Self::Build(ref args) => args.dry_run,
            Self::Deploy(ref args) => args.dry_run,
        }
    }
}

/// Arguments of the `build` command
#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    /// Algorithm configuration file
    #[arg(long, value_name = "PATH", default_value = "algorithm_config.yml")]
    pub yaml_file: String,

    /// CWL template file; the embedded CWL v1.2 template is used when omitted
    #[arg(long, value_name = "PATH")]
    pub cwl_template_file: Option<String>,

    /// Directory workflow files are written to (created if missing)
    #[arg(long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub workflow_output_dir: String,

    /// Repository name or owner/name
    #[arg(long, value_name = "NAME", env = "GITHUB_REPOSITORY")]
    pub repository_name: String,

    /// Branch, tag or ref being built
    #[arg(long = "ref", value_name = "REF", env = "GITHUB_REF_NAME")]
    pub reference: String,

    /// Source repository URL stamped as s:codeRepository
    #[arg(long, value_name = "URL", env = "REPOSITORY_URL")]
    pub repository_url: Option<String>,

    /// Commit hash stamped as s:commitHash
    #[arg(long, value_name = "SHA", env = "GIT_COMMIT_HASH")]
    pub commit_hash: Option<String>,

    /// Container image built for this ref; overrides the configured image
    #[arg(long, value_name = "IMAGE", env = "DOCKER_TAG")]
    pub docker_image: Option<String>,

    /// Value stamped as s:softwareVersion
    #[arg(long, value_name = "VERSION", default_value = crate::config::context::DEFAULT_SOFTWARE_VERSION)]
    pub software_version: String,

    /// Creation date (YYYY-MM-DD); defaults to today
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Output file name; defaults to process_<repo>_<ref>.cwl
    #[arg(long, value_name = "NAME", env = "WORKFLOW_FILE_NAME")]
    pub workflow_file_name: Option<String>,

    /// Print the workflow instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments of the `deploy` command
#[derive(Parser, Debug, Clone)]
pub struct DeployArgs {
    /// URL of the published process CWL
    #[arg(long, value_name = "URL")]
    pub process_cwl_url: String,

    /// Application package registration endpoint
    #[arg(long, value_name = "URL", env = "APP_PACK_REGISTER_ENDPOINT")]
    pub app_pack_register_endpoint: String,

    /// Application package template; the embedded ogcapppkg template is used when omitted
    #[arg(long, value_name = "PATH")]
    pub app_pack_template_file: Option<String>,

    /// Authentication token sent with the registration request
    #[arg(long, value_name = "TOKEN", env = "MAAP_PGT", hide_env_values = true)]
    pub token: Option<String>,

    /// Send the registration request even when no token is configured
    #[arg(long)]
    pub allow_anonymous: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Algorithm configuration to take the package title, description and version from
    #[arg(long, value_name = "PATH")]
    pub yaml_file: Option<String>,

    /// Package title
    #[arg(long)]
    pub title: Option<String>,

    /// Package description
    #[arg(long)]
    pub description: Option<String>,

    /// Package version
    #[arg(long = "package-version", value_name = "VERSION")]
    pub package_version: Option<String>,

    /// Replace the registered process when the endpoint reports a conflict
    #[arg(long)]
    pub replace_existing: bool,

    /// Print the request body instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}
