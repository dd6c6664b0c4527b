// src/exec/mod.rs

//! Execution layer.
//!
//! - [`backend`] provides the `TaskExecutor` trait the composer and the watch
//!   engine are written against; the production implementation is
//!   [`crate::task::Pipeline`], tests provide recording fakes.
//! - [`command`] runs the external transform commands with
//!   `tokio::process::Command` and captures their output.

pub mod backend;
pub mod command;

pub use backend::{TaskExecutor, TaskFuture};
pub use command::{render_template, run_shell, CommandOutput};
