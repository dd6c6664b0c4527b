// src/config/mod.rs

//! Configuration loading and validation for assetdag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, falling back to built-in defaults (`loader.rs`).
//! - Validate globs and the composite task graph (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{
    CleanSection, CompositeConfig, ConfigFile, CopySection, ImagesSection, PackageSection,
    ProjectSection, RawConfigFile, ScriptsSection, ServeSection, StylesSection, WatchSection,
};
