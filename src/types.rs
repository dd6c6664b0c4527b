// src/types.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::ConfigFile;

/// Build mode selected once at process start.
///
/// - `Development`: inline source maps, unminified output.
/// - `Production`: no source maps, minified output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl Mode {
    pub fn from_prod_flag(prod: bool) -> Self {
        if prod {
            Mode::Production
        } else {
            Mode::Development
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Mode::Production)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Development => f.write_str("development"),
            Mode::Production => f.write_str("production"),
        }
    }
}

/// Immutable build settings shared by every task of one process.
///
/// Constructed once in `run` and handed to tasks by reference; nothing
/// mutates it afterwards.
#[derive(Debug, Clone)]
pub struct BuildContext {
    mode: Mode,
    root: PathBuf,
    config: Arc<ConfigFile>,
}

impl BuildContext {
    pub fn new(mode: Mode, root: impl Into<PathBuf>, config: ConfigFile) -> Self {
        Self {
            mode,
            root: root.into(),
            config: Arc::new(config),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Project root all configured paths are relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Resolve a project-relative path against the root.
    pub fn resolve(&self, rel: impl AsRef<Path>) -> PathBuf {
        let rel = rel.as_ref();
        if rel.is_absolute() {
            rel.to_path_buf()
        } else {
            self.root.join(rel)
        }
    }
}
