//! crm-dedup - enforce uniqueness of workspace data
//!
//! Scans every active workspace for duplicate company domains, person
//! emails, view fields and view sorts, and repairs them unless `--dry-run`
//! is given.

use anyhow::{Context, Result};
use clap::Parser;
use crm_common::config::{RootFolderInitializer, RootFolderResolver};
use crm_dedup::db::{connect_core, SqliteTenantDataSource};
use crm_dedup::{Orchestrator, RunOptions};
use std::path::PathBuf;
use tracing::{debug, info};

/// Command-line arguments for crm-dedup
#[derive(Parser, Debug)]
#[command(name = "crm-dedup")]
#[command(about = "Detect and repair duplicate values across workspaces")]
#[command(version)]
struct Args {
    /// Log what would change without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Data root holding the core database and workspace databases
    #[arg(short, long, env = "CRM_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Only process this workspace (repeatable)
    #[arg(short, long = "workspace-id", value_name = "ID")]
    workspace_id: Vec<String>,

    /// Write the run summary as JSON to this file
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// TOML config file (default: <config dir>/crm/crm-dedup.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = RootFolderResolver::new("crm-dedup")
        .with_cli_arg(args.root_folder.clone())
        .with_config_file(args.config.clone());
    let loaded = resolver
        .load_config()
        .context("Failed to load configuration")?;
    let config = loaded.clone().unwrap_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .init();

    info!(
        "Starting crm-dedup v{}{}",
        env!("CARGO_PKG_VERSION"),
        if args.dry_run { " (dry run)" } else { "" }
    );

    match (loaded.is_some(), resolver.config_file_path()) {
        (true, Some(path)) => info!("Loaded config from {}", path.display()),
        (false, Some(path)) => debug!("No config file at {}, using defaults", path.display()),
        _ => debug!("No config directory, using defaults"),
    }

    let root_folder = resolver.resolve_with(Some(&config));
    let layout = RootFolderInitializer::new(root_folder).with_config(&config);
    info!("Root folder: {}", layout.root_folder().display());

    if !layout.core_database_exists() {
        anyhow::bail!(
            "Core database not found: {}\nCheck --root-folder or CRM_ROOT_FOLDER.",
            layout.core_database_path().display()
        );
    }

    let core = connect_core(&layout.core_database_path())
        .await
        .context("Failed to open core database")?;

    let source = SqliteTenantDataSource::new(core, layout);
    let options = RunOptions {
        dry_run: args.dry_run,
        workspace_ids: args.workspace_id,
    };

    let summary = Orchestrator::new(&source, options)
        .run()
        .await
        .context("Failed to list active workspaces")?;

    if let Some(path) = args.export {
        summary
            .export_json(&path)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        info!("Summary written to {}", path.display());
    }

    Ok(())
}
