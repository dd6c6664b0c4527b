// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::TaskExecutor;

use super::core::{DispatchPlan, WatchCore};
use super::{CoreCommand, DispatchOutcome, RuntimeEvent};

/// Drives the watch core in response to `RuntimeEvent`s and runs the
/// resulting dispatches through a `TaskExecutor`.
///
/// This is a pure IO shell around `WatchCore`, which holds all the
/// coalescing and lifecycle rules. Dispatches run on spawned tasks and
/// report back through the same event channel.
pub struct Runtime<E: TaskExecutor + Clone + 'static> {
    core: WatchCore,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    event_tx: mpsc::Sender<RuntimeEvent>,
    executor: E,
}

impl<E: TaskExecutor + Clone + 'static> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: TaskExecutor + Clone + 'static> Runtime<E> {
    /// `event_tx` must feed `event_rx`; dispatch completions are sent on it.
    pub fn new(
        core: WatchCore,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        event_tx: mpsc::Sender<RuntimeEvent>,
        executor: E,
    ) -> Self {
        Self {
            core,
            event_rx,
            event_tx,
            executor,
        }
    }

    /// Main event loop.
    ///
    /// Returns once `shutdown` is cancelled and every in-flight dispatch has
    /// reported back.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<()> {
        info!("watch engine started");
        let mut shutdown_seen = false;

        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled(), if !shutdown_seen => {
                    shutdown_seen = true;
                    RuntimeEvent::ShutdownRequested
                }
                event = self.event_rx.recv() => match event {
                    Some(e) => e,
                    None => {
                        info!("watch event channel closed; exiting");
                        break;
                    }
                },
            };

            debug!(?event, "watch engine received event");

            let step = self.core.step(event);
            for command in step.commands {
                self.execute_command(command);
            }

            if !step.keep_running {
                break;
            }
        }

        info!("watch engine stopped");
        Ok(())
    }

    fn execute_command(&self, command: CoreCommand) {
        match command {
            CoreCommand::Dispatch(plan) => self.spawn_dispatch(plan),
            CoreCommand::RequestExit => debug!("in-flight dispatches drained"),
        }
    }

    fn spawn_dispatch(&self, plan: DispatchPlan) {
        let executor = self.executor.clone();
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let outcome = match run_dispatch(&executor, &plan).await {
                Ok(()) => DispatchOutcome::Success,
                Err(e) => DispatchOutcome::Failed(e.to_string()),
            };
            let _ = tx
                .send(RuntimeEvent::DispatchCompleted {
                    binding: plan.binding,
                    outcome,
                })
                .await;
        });
    }
}

/// Run a binding's tasks in order, then `reload` if requested and all
/// succeeded.
pub async fn run_dispatch<E: TaskExecutor + ?Sized>(executor: &E, plan: &DispatchPlan) -> Result<()> {
    plan.as_plan().run(executor).await
}
