// src/exec/backend.rs

//! Pluggable task executor abstraction.
//!
//! The composer and the watch engine talk to a `TaskExecutor` instead of the
//! concrete task registry. This makes it easy to swap in a recording fake in
//! tests while production code uses [`crate::task::Pipeline`].

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;

/// Future returned by every task invocation.
pub type TaskFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Runs leaf tasks by name.
///
/// The returned future owns everything it needs, so it can be spawned or
/// polled alongside other invocations on the same loop.
pub trait TaskExecutor: Send + Sync {
    /// Run the leaf task called `name` to completion.
    fn run_task(&self, name: &str) -> TaskFuture<'static>;
}
