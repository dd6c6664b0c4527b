// src/server/mod.rs

//! Local preview server.
//!
//! - [`preview`] serves the output root over HTTP with `axum` and hosts the
//!   live-reload websocket.
//! - [`live_reload`] is the broadcast hub tasks use to push `reload` and
//!   stylesheet `inject` notifications to connected browsers.

pub mod live_reload;
pub mod preview;

pub use live_reload::{LiveReload, ReloadMessage};
pub use preview::{start_preview, PreviewHandle};
