// src/task/mod.rs

//! Leaf tasks and the pipeline that runs them.
//!
//! Every leaf task implements [`Task`]. The [`Pipeline`] owns one instance of
//! each, registered at startup, and is the production [`TaskExecutor`] the
//! composer and the watch engine drive.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::errors::{AssetdagError, Result};
use crate::exec::{TaskExecutor, TaskFuture};
use crate::fs::FileSystem;
use crate::server::{LiveReload, PreviewHandle};
use crate::types::BuildContext;

pub mod clean;
pub mod copy;
pub mod package;
pub mod reload;
pub mod scripts;
pub mod serve;
pub mod styles;
pub mod watch;

/// Names of every leaf task, in the order `--list` prints them.
pub const LEAF_TASKS: &[&str] = &[
    "clean", "styles", "scripts", "images", "copy", "serve", "reload", "watch", "package",
];

pub fn is_leaf_task(name: &str) -> bool {
    LEAF_TASKS.contains(&name)
}

/// A named unit of work.
pub trait Task: Send + Sync {
    fn name(&self) -> &'static str;

    fn run<'a>(&'a self, pipeline: &'a Pipeline) -> TaskFuture<'a>;
}

/// Shared state every task runs against.
///
/// Cloning is cheap; clones share the registry, the preview server slot and
/// the shutdown token.
#[derive(Clone)]
pub struct Pipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    ctx: BuildContext,
    fs: Arc<dyn FileSystem>,
    live_reload: LiveReload,
    shutdown: CancellationToken,
    preview: Mutex<Option<PreviewHandle>>,
    tasks: BTreeMap<&'static str, Arc<dyn Task>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("mode", &self.inner.ctx.mode())
            .field("root", &self.inner.ctx.root())
            .field("tasks", &self.inner.tasks.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(ctx: BuildContext, fs: Arc<dyn FileSystem>, shutdown: CancellationToken) -> Self {
        let leaf_tasks: Vec<Arc<dyn Task>> = vec![
            Arc::new(clean::CleanTask),
            Arc::new(styles::StylesTask),
            Arc::new(scripts::ScriptsTask),
            Arc::new(copy::CopyTask::images()),
            Arc::new(copy::CopyTask::copy()),
            Arc::new(serve::ServeTask),
            Arc::new(reload::ReloadTask),
            Arc::new(watch::WatchTask),
            Arc::new(package::PackageTask),
        ];
        let tasks = leaf_tasks.into_iter().map(|t| (t.name(), t)).collect();

        Self {
            inner: Arc::new(PipelineInner {
                ctx,
                fs,
                live_reload: LiveReload::new(),
                shutdown,
                preview: Mutex::new(None),
                tasks,
            }),
        }
    }

    pub fn context(&self) -> &BuildContext {
        &self.inner.ctx
    }

    pub fn fs(&self) -> Arc<dyn FileSystem> {
        Arc::clone(&self.inner.fs)
    }

    pub fn live_reload(&self) -> &LiveReload {
        &self.inner.live_reload
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown
    }

    /// The running preview server, if `serve` has run.
    pub fn preview(&self) -> Option<PreviewHandle> {
        *self
            .inner
            .preview
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_preview(&self, handle: PreviewHandle) {
        *self
            .inner
            .preview
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(handle);
    }
}

impl TaskExecutor for Pipeline {
    fn run_task(&self, name: &str) -> TaskFuture<'static> {
        let pipeline = self.clone();
        let name = name.to_string();

        Box::pin(async move {
            let task = pipeline
                .inner
                .tasks
                .get(name.as_str())
                .cloned()
                .ok_or_else(|| AssetdagError::TaskNotFound(name.clone()))?;

            info!(task = %name, "starting");
            let started = Instant::now();
            let result = task.run(&pipeline).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => info!(task = %name, elapsed_ms, "finished"),
                Err(e) => error!(task = %name, elapsed_ms, error = %e, "failed"),
            }
            result
        })
    }
}

/// Run blocking file work off the event loop.
///
/// An [`AssetdagError`] raised inside `f` comes back as itself rather than
/// wrapped in `Other`.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(anyhow::Error::from)?
        .map_err(|err| err.downcast::<AssetdagError>().unwrap_or_else(AssetdagError::Other))
}
