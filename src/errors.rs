// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetdagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Cycle detected in composite tasks: {0}")]
    CompositeCycle(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Project descriptor error: {0}")]
    DescriptorError(String),

    #[error("Task '{task}' failed: {reason}")]
    TaskFailed { task: String, reason: String },

    #[error("Archive error: {0}")]
    ArchiveError(#[from] zip::result::ZipError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AssetdagError {
    pub fn task_failed(task: impl Into<String>, reason: impl Into<String>) -> Self {
        AssetdagError::TaskFailed {
            task: task.into(),
            reason: reason.into(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AssetdagError>;
