// src/engine/core.rs

//! Pure core of the watch engine.
//!
//! [`WatchCore`] consumes [`RuntimeEvent`]s and produces [`CoreCommand`]s
//! describing what the IO shell should do next. It has no channels, no Tokio
//! types and performs no IO, so it can be unit tested directly.
//!
//! Coalescing: while a binding is dispatching, further triggers for that
//! binding collapse into a single pending re-run. Different bindings
//! dispatch independently.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::dag::plan::{sequence, Plan};
use crate::engine::{BindingName, DispatchOutcome, EngineState, RuntimeEvent, TaskName};
use crate::watch::WatchBinding;

/// What a binding runs when it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPlan {
    pub binding: BindingName,
    pub tasks: Vec<TaskName>,
    /// Run `reload` after `tasks` succeed.
    pub reload: bool,
}

impl DispatchPlan {
    pub fn new(binding: impl Into<BindingName>, tasks: Vec<TaskName>, reload: bool) -> Self {
        Self {
            binding: binding.into(),
            tasks,
            reload,
        }
    }

    /// The binding's tasks followed by `reload` when requested.
    pub fn as_plan(&self) -> Plan {
        let reload = self.reload.then(|| Plan::task("reload"));
        sequence(self.tasks.iter().map(Plan::task).chain(reload))
    }
}

impl From<&WatchBinding> for DispatchPlan {
    fn from(binding: &WatchBinding) -> Self {
        DispatchPlan::new(binding.name(), binding.tasks().to_vec(), binding.reload())
    }
}

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Run a binding's plan.
    Dispatch(DispatchPlan),
    /// Every dispatch has drained after shutdown; the shell should stop.
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

#[derive(Debug)]
pub struct WatchCore {
    plans: BTreeMap<BindingName, DispatchPlan>,
    in_flight: BTreeSet<BindingName>,
    pending: BTreeSet<BindingName>,
    state: EngineState,
    shutting_down: bool,
}

impl WatchCore {
    pub fn new(bindings: &[WatchBinding]) -> Self {
        Self::from_plans(bindings.iter().map(DispatchPlan::from))
    }

    pub fn from_plans(plans: impl IntoIterator<Item = DispatchPlan>) -> Self {
        Self {
            plans: plans.into_iter().map(|p| (p.binding.clone(), p)).collect(),
            in_flight: BTreeSet::new(),
            pending: BTreeSet::new(),
            state: EngineState::Idle,
            shutting_down: false,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Bindings currently dispatching.
    pub fn in_flight(&self) -> Vec<&str> {
        self.in_flight.iter().map(String::as_str).collect()
    }

    pub fn has_pending(&self, binding: &str) -> bool {
        self.pending.contains(binding)
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::WatcherReady => {
                if self.state == EngineState::Idle {
                    self.state = EngineState::Watching;
                    info!(bindings = self.plans.len(), "watching for changes");
                }
                CoreStep::running(Vec::new())
            }
            RuntimeEvent::BindingTriggered { binding, path } => self.handle_trigger(binding, path),
            RuntimeEvent::DispatchCompleted { binding, outcome } => {
                self.handle_completion(binding, outcome)
            }
            RuntimeEvent::ShutdownRequested => self.handle_shutdown(),
        }
    }

    fn handle_trigger(&mut self, binding: BindingName, path: String) -> CoreStep {
        if self.shutting_down || self.state == EngineState::Stopped {
            debug!(%binding, %path, "shutting down; ignoring trigger");
            return CoreStep::running(Vec::new());
        }

        let Some(plan) = self.plans.get(&binding) else {
            warn!(%binding, "trigger for unknown binding; ignoring");
            return CoreStep::running(Vec::new());
        };

        if self.in_flight.contains(&binding) {
            debug!(%binding, %path, "binding busy; coalescing into one pending run");
            self.pending.insert(binding);
            return CoreStep::running(Vec::new());
        }

        info!(%binding, %path, "change detected");
        let plan = plan.clone();
        self.in_flight.insert(binding);
        self.state = EngineState::Dispatching;
        CoreStep::running(vec![CoreCommand::Dispatch(plan)])
    }

    fn handle_completion(&mut self, binding: BindingName, outcome: DispatchOutcome) -> CoreStep {
        self.in_flight.remove(&binding);

        match &outcome {
            DispatchOutcome::Success => debug!(%binding, "dispatch finished"),
            DispatchOutcome::Failed(reason) => {
                warn!(%binding, %reason, "dispatch failed; still watching")
            }
        }

        let mut commands = Vec::new();
        if !self.shutting_down && self.pending.remove(&binding) {
            if let Some(plan) = self.plans.get(&binding) {
                debug!(%binding, "running coalesced trigger");
                self.in_flight.insert(binding);
                commands.push(CoreCommand::Dispatch(plan.clone()));
            }
        }

        self.settle(commands)
    }

    fn handle_shutdown(&mut self) -> CoreStep {
        info!(in_flight = self.in_flight.len(), "watch engine shutdown requested");
        self.shutting_down = true;
        self.pending.clear();
        self.settle(Vec::new())
    }

    /// Recompute the state after in-flight bookkeeping changed.
    fn settle(&mut self, mut commands: Vec<CoreCommand>) -> CoreStep {
        if !self.in_flight.is_empty() {
            self.state = EngineState::Dispatching;
            return CoreStep::running(commands);
        }

        if self.shutting_down {
            self.state = EngineState::Stopped;
            commands.push(CoreCommand::RequestExit);
            return CoreStep {
                commands,
                keep_running: false,
            };
        }

        if self.state != EngineState::Idle {
            self.state = EngineState::Watching;
        }
        CoreStep::running(commands)
    }
}
