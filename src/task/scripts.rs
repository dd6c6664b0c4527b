// src/task/scripts.rs

use std::path::PathBuf;

use anyhow::Context;
use tracing::{debug, info};

use crate::errors::AssetdagError;
use crate::exec::{render_template, run_shell, TaskFuture};
use crate::task::styles::output_path;
use crate::task::{Pipeline, Task};

/// Bundles the script entry module with the configured bundler.
///
/// The bundler writes `<dest>/<entry stem>.js` itself. A non-zero exit fails
/// the task with the tail of its stderr.
pub struct ScriptsTask;

impl Task for ScriptsTask {
    fn name(&self) -> &'static str {
        "scripts"
    }

    fn run<'a>(&'a self, pipeline: &'a Pipeline) -> TaskFuture<'a> {
        Box::pin(async move {
            let ctx = pipeline.context();
            let cfg = ctx.config().scripts();
            let mode = ctx.mode();

            let output_rel = output_path(&cfg.entry, &cfg.dest, "js");
            let dest_dir = ctx.resolve(&cfg.dest);
            tokio::fs::create_dir_all(&dest_dir)
                .await
                .with_context(|| format!("creating {:?}", dest_dir))?;

            if mode.is_production() {
                let mut stale_map = ctx.resolve(&output_rel).into_os_string();
                stale_map.push(".map");
                let stale_map = PathBuf::from(stale_map);
                debug!(path = ?stale_map, "removing development source map");
                pipeline.fs().remove_file(&stale_map)?;
            }

            let template = if mode.is_production() {
                &cfg.cmd_production
            } else {
                &cfg.cmd
            };
            let output_str = output_rel.to_string_lossy();
            let cmd = render_template(
                template,
                &[
                    ("input", cfg.entry.as_str()),
                    ("output", &*output_str),
                    ("dest", cfg.dest.as_str()),
                ],
            );

            let output = run_shell("scripts", &cmd, ctx.root()).await?;
            if !output.success {
                return Err(AssetdagError::task_failed(
                    "scripts",
                    format!(
                        "bundler exited with code {}: {}",
                        output.exit_code,
                        output.stderr_tail(20)
                    ),
                ));
            }

            info!(output = ?output_rel, %mode, "script bundle written");
            Ok(())
        })
    }
}
