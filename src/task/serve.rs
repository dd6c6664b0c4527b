// src/task/serve.rs

use tracing::{info, warn};

use crate::exec::TaskFuture;
use crate::server::start_preview;
use crate::task::{Pipeline, Task};

/// Starts the preview server and returns once it is listening.
///
/// The server keeps running until the pipeline's shutdown token fires.
pub struct ServeTask;

impl Task for ServeTask {
    fn name(&self) -> &'static str {
        "serve"
    }

    fn run<'a>(&'a self, pipeline: &'a Pipeline) -> TaskFuture<'a> {
        Box::pin(async move {
            if let Some(running) = pipeline.preview() {
                warn!(url = %running.url(), "preview server already running");
                return Ok(());
            }

            let ctx = pipeline.context();
            let serve = ctx.config().serve();
            let handle = start_preview(
                ctx.resolve(&serve.root),
                &serve.host,
                serve.port,
                pipeline.live_reload().clone(),
                pipeline.shutdown_token().clone(),
            )
            .await?;

            info!(url = %handle.url(), "preview available");
            pipeline.set_preview(handle);
            Ok(())
        })
    }
}
