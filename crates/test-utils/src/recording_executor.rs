use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assetdag::errors::AssetdagError;
use assetdag::exec::{TaskExecutor, TaskFuture};

/// One observed task event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Started(String),
    Finished(String),
}

#[derive(Default)]
struct State {
    log: Vec<Call>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
}

/// A fake executor that:
/// - records when each task starts and finishes
/// - fails tasks registered with [`RecordingExecutor::fail`]
/// - optionally sleeps inside a task, to observe concurrency.
///
/// Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingExecutor {
    state: Arc<Mutex<State>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, task: &str) -> &Self {
        self.state.lock().unwrap().failing.insert(task.to_string());
        self
    }

    pub fn succeed(&self, task: &str) -> &Self {
        self.state.lock().unwrap().failing.remove(task);
        self
    }

    pub fn delay(&self, task: &str, delay: Duration) -> &Self {
        self.state
            .lock()
            .unwrap()
            .delays
            .insert(task.to_string(), delay);
        self
    }

    /// Full start/finish log.
    pub fn log(&self) -> Vec<Call> {
        self.state.lock().unwrap().log.clone()
    }

    /// Names of started tasks, in start order.
    pub fn started(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|c| match c {
                Call::Started(name) => Some(name),
                Call::Finished(_) => None,
            })
            .collect()
    }

    pub fn count(&self, task: &str) -> usize {
        self.started().iter().filter(|n| *n == task).count()
    }

    pub fn clear(&self) {
        self.state.lock().unwrap().log.clear();
    }
}

impl TaskExecutor for RecordingExecutor {
    fn run_task(&self, name: &str) -> TaskFuture<'static> {
        let state = Arc::clone(&self.state);
        let name = name.to_string();

        Box::pin(async move {
            let (delay, fails) = {
                let mut guard = state.lock().unwrap();
                guard.log.push(Call::Started(name.clone()));
                (guard.delays.get(&name).copied(), guard.failing.contains(&name))
            };

            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            state.lock().unwrap().log.push(Call::Finished(name.clone()));

            if fails {
                Err(AssetdagError::task_failed(name, "configured to fail"))
            } else {
                Ok(())
            }
        })
    }
}
