//! Fabdeploy - dependency descriptor and feature deployment
//!
//! Usage:
//!   fabdeploy deploy --tree deps.json       # Build descriptor, install features
//!   fabdeploy descriptor --tree deps.json   # Print descriptor JSON only
//!   fabdeploy tree --tree deps.json         # Print the walked dependency tree

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fabdeploy_core::commands::DeployCommand;
use fabdeploy_core::config::{self, DeployConfig, Settings};
use fabdeploy_core::dependency::{Artifact, ResolvedNode, render_tree};

#[derive(Parser)]
#[command(name = "fabdeploy")]
#[command(about = "Deploy project features to a managed runtime", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the descriptor, register feature repositories and install features
    Deploy(DeployArgs),

    /// Build the descriptor and print it as JSON (no network access)
    Descriptor(TreeArgs),

    /// Print the walked dependency tree
    Tree(TreeArgs),
}

#[derive(Args)]
struct TreeArgs {
    /// Project directory containing fabdeploy.toml
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,

    /// Resolved dependency tree exported by the build (JSON)
    #[arg(long)]
    tree: Option<PathBuf>,

    /// Project groupId, used when no tree file is given
    #[arg(long)]
    group_id: Option<String>,

    /// Project artifactId, used when no tree file is given
    #[arg(long)]
    artifact_id: Option<String>,

    /// Project version, used when no tree file is given
    #[arg(long = "project-version")]
    project_version: Option<String>,

    /// Project packaging type
    #[arg(long, default_value = "jar")]
    packaging: String,

    /// Dependency scope to resolve (compile, runtime, test, provided, system)
    #[arg(long)]
    scope: Option<String>,

    /// Maximum dependency tree depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Whitespace-separated bundle URLs
    #[arg(long)]
    bundles: Option<String>,

    /// Whitespace-separated feature names
    #[arg(long)]
    features: Option<String>,

    /// Whitespace-separated feature repository URLs
    #[arg(long)]
    feature_repos: Option<String>,

    /// Write the descriptor JSON to this path
    #[arg(long)]
    descriptor_out: Option<PathBuf>,
}

#[derive(Args)]
struct DeployArgs {
    #[command(flatten)]
    tree: TreeArgs,

    /// Management endpoint URL
    #[arg(long)]
    endpoint_url: Option<String>,

    /// Server id in settings.toml holding the credentials
    #[arg(long)]
    server_id: Option<String>,

    /// Username (overrides settings.toml)
    #[arg(long)]
    username: Option<String>,

    /// Password (overrides settings.toml)
    #[arg(long)]
    password: Option<String>,

    /// Times the remote call sequence may run (clamped to 1-10)
    #[arg(long)]
    retry_failed_deployment_count: Option<i64>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Settings file with server credentials
    #[arg(long)]
    settings: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "fabdeploy=debug,fabdeploy_core=debug,info"
    } else {
        "fabdeploy=info,fabdeploy_core=info,warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Deploy(args) => run_deploy(args),
        Commands::Descriptor(args) => run_descriptor(args),
        Commands::Tree(args) => run_tree(args),
    }
}

fn run_deploy(args: DeployArgs) -> Result<()> {
    let mut config = load_config(&args.tree)?;
    if let Some(url) = args.endpoint_url {
        config.endpoint_url = url;
    }
    if let Some(id) = args.server_id {
        config.server_id = id;
    }
    if args.username.is_some() {
        config.username = args.username;
    }
    if args.password.is_some() {
        config.password = args.password;
    }
    if let Some(count) = args.retry_failed_deployment_count {
        config.retry_failed_deployment_count = count;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }

    let settings_path = match args.settings {
        Some(path) => Some(path),
        None => config::default_settings_path(),
    };
    let settings = match settings_path {
        Some(path) => Settings::load(&path)?,
        None => Settings::default(),
    };

    let tree = load_tree(&args.tree, config.max_depth)?;
    let report = DeployCommand::new(config).execute(&settings, tree)?;

    for call in &report.install.calls {
        println!("{} {}: ok", call.operation, call.argument);
    }
    if report.install.calls.is_empty() {
        println!("Nothing to deploy");
    }
    Ok(())
}

fn run_descriptor(args: TreeArgs) -> Result<()> {
    let config = load_config(&args)?;
    let tree = load_tree(&args, config.max_depth)?;
    let report = DeployCommand::new(config).build_descriptor(tree)?;
    println!("{}", report.descriptor.to_json()?);
    Ok(())
}

fn run_tree(args: TreeArgs) -> Result<()> {
    let config = load_config(&args)?;
    let tree = load_tree(&args, config.max_depth)?;
    let report = DeployCommand::new(config).build_descriptor(tree)?;
    match report.descriptor.root() {
        Some(root) => print!("{}", render_tree(root)),
        None => println!("(no resolvable artifacts)"),
    }
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

/// Project config with tree-related flags applied.
fn load_config(args: &TreeArgs) -> Result<DeployConfig> {
    let mut config = config::load_deploy_config(&args.project_dir)?;
    if let Some(scope) = &args.scope {
        config.scope = scope.clone();
    }
    if let Some(depth) = args.max_depth {
        config.max_depth = depth;
    }
    if args.bundles.is_some() {
        config.bundles = args.bundles.clone();
    }
    if args.features.is_some() {
        config.features = args.features.clone();
    }
    if args.feature_repos.is_some() {
        config.feature_repos = args.feature_repos.clone();
    }
    if args.descriptor_out.is_some() {
        config.descriptor_out = args.descriptor_out.clone();
    }
    Ok(config)
}

fn load_tree(args: &TreeArgs, max_depth: usize) -> Result<ResolvedNode> {
    if let Some(path) = &args.tree {
        return ResolvedNode::load(path, max_depth);
    }

    let (Some(group_id), Some(artifact_id), Some(version)) =
        (&args.group_id, &args.artifact_id, &args.project_version)
    else {
        anyhow::bail!(
            "Missing dependency tree: pass --tree or --group-id, --artifact-id and --project-version"
        );
    };

    Ok(ResolvedNode::new(
        Artifact::new(group_id, artifact_id, version).with_type(&args.packaging),
    ))
}
