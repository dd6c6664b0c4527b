// src/dag/mod.rs

//! Task graph composition.
//!
//! - [`plan`] holds the `Plan` tree and the `sequence` / `parallel`
//!   combinators that execute it.
//! - [`composites`] names the built-in composites and resolves user
//!   composites from the config into plans of leaf tasks.

pub mod composites;
pub mod plan;

pub use composites::{CompositeRegistry, BUILTIN_COMPOSITES};
pub use plan::{parallel, sequence, Plan};
