// src/task/watch.rs

use tokio::sync::mpsc;

use crate::engine::{Runtime, RuntimeEvent, WatchCore};
use crate::exec::TaskFuture;
use crate::task::{Pipeline, Task};
use crate::watch::{build_bindings, spawn_watcher};

/// Runs the watch engine until shutdown.
pub struct WatchTask;

impl Task for WatchTask {
    fn name(&self) -> &'static str {
        "watch"
    }

    fn run<'a>(&'a self, pipeline: &'a Pipeline) -> TaskFuture<'a> {
        Box::pin(async move {
            let ctx = pipeline.context();
            let bindings = build_bindings(ctx.config())?;
            let core = WatchCore::new(&bindings);

            let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);
            let source_root = ctx.resolve(&ctx.config().watch().source_root);
            let _watcher = spawn_watcher(ctx.root(), source_root, bindings, tx.clone()).await?;

            Runtime::new(core, rx, tx, pipeline.clone())
                .run(pipeline.shutdown_token().clone())
                .await
        })
    }
}
