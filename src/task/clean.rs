// src/task/clean.rs

use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use tracing::info;

use crate::errors::AssetdagError;
use crate::exec::TaskFuture;
use crate::task::{blocking, Pipeline, Task};

/// Deletes the output root.
pub struct CleanTask;

impl Task for CleanTask {
    fn name(&self) -> &'static str {
        "clean"
    }

    fn run<'a>(&'a self, pipeline: &'a Pipeline) -> TaskFuture<'a> {
        Box::pin(async move {
            let ctx = pipeline.context();
            let target = ctx.resolve(&ctx.config().clean().target);

            // Never wipe the project itself, however the target is spelled.
            if contains_path(&target, ctx.root()) {
                return Err(AssetdagError::ConfigError(format!(
                    "refusing to clean {:?}: it contains the project root",
                    target
                )));
            }

            info!(dir = ?target, "removing output root");
            let fs = pipeline.fs();
            blocking(move || {
                fs.remove_dir_all(&target)
                    .with_context(|| format!("removing {:?}", target))
            })
            .await
        })
    }
}

/// Whether `dir` is `path` or one of its ancestors, after `.` and `..`
/// have been folded away.
pub fn contains_path(dir: &Path, path: &Path) -> bool {
    normalize(dir).map_or(true, |dir| {
        normalize(path).map_or(true, |path| path.starts_with(dir))
    })
}

/// Absolute, lexically normalized form of `path`.
///
/// Symlinks are not followed. Returns `None` when the current directory
/// cannot be determined for a relative path.
fn normalize(path: &Path) -> Option<PathBuf> {
    let absolute = std::path::absolute(path).ok()?;
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    Some(out)
}

