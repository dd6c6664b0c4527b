// src/watch/bindings.rs

//! Watch bindings: which source globs re-run which tasks in dev mode.

use anyhow::{Context, Result};

use crate::config::ConfigFile;
use crate::engine::{BindingName, TaskName};
use crate::pathset::{PathSet, PathSetMatcher};

/// One `glob set → tasks` rule observed by the watch engine.
#[derive(Debug, Clone)]
pub struct WatchBinding {
    name: BindingName,
    matcher: PathSetMatcher,
    tasks: Vec<TaskName>,
    reload: bool,
}

impl WatchBinding {
    pub fn new(
        name: impl Into<BindingName>,
        paths: &PathSet,
        tasks: Vec<TaskName>,
        reload: bool,
    ) -> Result<Self> {
        let name = name.into();
        let matcher = paths
            .compile()
            .with_context(|| format!("compiling globs for watch binding '{name}'"))?;
        Ok(Self {
            name,
            matcher,
            tasks,
            reload,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tasks(&self) -> &[TaskName] {
        &self.tasks
    }

    /// Whether a successful run is followed by a full-page reload.
    pub fn reload(&self) -> bool {
        self.reload
    }

    /// `rel_path` is relative to the project root, with forward slashes.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.matcher.matches(rel_path)
    }
}

/// Build the dev-mode bindings from config.
///
/// | binding     | tasks       | reload afterwards           |
/// |-------------|-------------|-----------------------------|
/// | `styles`    | `styles`    | no (stylesheets are injected) |
/// | `scripts`   | `scripts`   | yes                         |
/// | `templates` | none        | yes                         |
/// | `images`    | `images`    | `watch.reload_after_copy`   |
/// | `other`     | `copy`      | `watch.reload_after_copy`   |
pub fn build_bindings(cfg: &ConfigFile) -> Result<Vec<WatchBinding>> {
    let reload_after_copy = cfg.watch().reload_after_copy;
    let watch_only = |globs: &[String]| PathSet::new(globs.to_vec(), Vec::new(), "");

    Ok(vec![
        WatchBinding::new(
            "styles",
            &watch_only(&cfg.styles().watch),
            vec!["styles".into()],
            false,
        )?,
        WatchBinding::new(
            "scripts",
            &watch_only(&cfg.scripts().watch),
            vec!["scripts".into()],
            true,
        )?,
        WatchBinding::new("templates", &watch_only(&cfg.watch().templates), Vec::new(), true)?,
        WatchBinding::new("images", &cfg.images(), vec!["images".into()], reload_after_copy)?,
        WatchBinding::new("other", &cfg.copy(), vec!["copy".into()], reload_after_copy)?,
    ])
}

/// Bindings fired by a change to `rel_path`, in declaration order.
pub fn matching_bindings<'a>(bindings: &'a [WatchBinding], rel_path: &str) -> Vec<&'a WatchBinding> {
    bindings.iter().filter(|b| b.matches(rel_path)).collect()
}
