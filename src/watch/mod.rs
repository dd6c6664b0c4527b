// src/watch/mod.rs

//! File watching for the dev loop.
//!
//! This module is responsible for:
//! - Compiling the dev-mode watch bindings from config.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Turning filesystem changes into binding-level triggers.
//!
//! It does **not** run tasks; the engine decides what and when.

pub mod bindings;
pub mod path_utils;
pub mod watcher;

pub use bindings::{build_bindings, matching_bindings, WatchBinding};
pub use watcher::{spawn_watcher, triggers_for_paths, WatcherHandle};
