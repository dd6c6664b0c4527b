// src/engine/mod.rs

//! Watch engine for assetdag.
//!
//! This module ties together:
//! - the watch bindings (which tasks a source change re-runs)
//! - the main event loop that reacts to:
//!   - file-watch triggers
//!   - dispatch completion events
//!   - shutdown requests
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

/// Canonical task name type used throughout the engine.
pub type TaskName = String;

/// Name of a watch binding (`styles`, `scripts`, `templates`, ...).
pub type BindingName = String;

/// Lifecycle of the watch engine.
///
/// `Idle → Watching → Dispatching → Watching`, and `Stopped` once shutdown
/// has been requested and every in-flight dispatch has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Watching,
    Dispatching,
    Stopped,
}

/// Result of running one binding's tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Success,
    Failed(String),
}

/// Events flowing into the engine from the watcher, dispatchers, etc.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// The filesystem watcher is armed.
    WatcherReady,
    /// A changed path matched a binding.
    BindingTriggered { binding: BindingName, path: String },
    /// A binding's dispatch finished.
    DispatchCompleted {
        binding: BindingName,
        outcome: DispatchOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod runtime;

pub use core::{CoreCommand, CoreStep, DispatchPlan, WatchCore};
pub use runtime::Runtime;
