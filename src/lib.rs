// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pathset;
pub mod project;
pub mod server;
pub mod task;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::load_or_default;
use crate::dag::{CompositeRegistry, Plan};
use crate::errors::AssetdagError;
use crate::fs::RealFileSystem;
use crate::task::{Pipeline, LEAF_TASKS};
use crate::types::{BuildContext, Mode};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - composite resolution
/// - the task pipeline
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args.config.as_ref().map(PathBuf::from);
    let cfg = load_or_default(config_path.as_deref())?;
    let registry = CompositeRegistry::from_config(&cfg);

    if args.list {
        print_task_list(&registry);
        return Ok(());
    }

    let plan = resolve_cli_task(&registry, &args.task)?;
    let mode = Mode::from_prod_flag(args.prod);

    if args.dry_run {
        print_dry_run(&args.task, mode, &plan);
        return Ok(());
    }

    let root = project_root(config_path.as_deref());
    let ctx = BuildContext::new(mode, root, cfg);

    // Ctrl-C → graceful shutdown of the watch engine and preview server.
    let shutdown = CancellationToken::new();
    {
        let token = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl-C received; shutting down");
            token.cancel();
        });
    }

    let pipeline = Pipeline::new(ctx, Arc::new(RealFileSystem), shutdown.clone());
    info!(task = %args.task, %mode, root = ?pipeline.context().root(), "running");

    plan.run(&pipeline).await?;

    if let Some(preview) = pipeline.preview() {
        if !shutdown.is_cancelled() {
            info!(url = %preview.url(), "tasks finished; preview server still running (Ctrl-C to stop)");
            shutdown.cancelled().await;
        }
    }
    shutdown.cancel();

    info!(task = %args.task, "done");
    Ok(())
}

/// Resolve a task named on the command line.
///
/// `package` is only meaningful after a full build, so it is only reachable
/// through a composite such as `bundle`.
pub fn resolve_cli_task(registry: &CompositeRegistry, name: &str) -> errors::Result<Plan> {
    if name == "package" {
        return Err(AssetdagError::ConfigError(
            "`package` cannot be run on its own; use `bundle` or a composite that builds first"
                .to_string(),
        ));
    }
    registry.resolve(name)
}

/// Project root: the config file's directory, or the current directory.
fn project_root(config_path: Option<&Path>) -> PathBuf {
    match config_path.and_then(Path::parent) {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn print_task_list(registry: &CompositeRegistry) {
    println!("tasks:");
    for name in LEAF_TASKS {
        println!("  - {name}");
    }
    println!();
    println!("composites:");
    for name in registry.composite_names() {
        if let Some(definition) = registry.definition(&name) {
            println!("  - {name}: {}", definition.summary());
        }
    }
}

/// Dry-run output: mode plus the fully resolved plan tree.
fn print_dry_run(task: &str, mode: Mode, plan: &Plan) {
    println!("assetdag dry-run");
    println!("  task = {task}");
    println!("  mode = {mode}");
    println!();
    print!("{plan}");

    debug!("dry-run complete (no execution)");
}
