// src/task/reload.rs

use tracing::debug;

use crate::exec::TaskFuture;
use crate::task::{Pipeline, Task};

/// Asks every connected preview client to reload the page.
pub struct ReloadTask;

impl Task for ReloadTask {
    fn name(&self) -> &'static str {
        "reload"
    }

    fn run<'a>(&'a self, pipeline: &'a Pipeline) -> TaskFuture<'a> {
        Box::pin(async move {
            let hub = pipeline.live_reload();
            debug!(clients = hub.client_count(), "requesting page reload");
            hub.reload();
            Ok(())
        })
    }
}
