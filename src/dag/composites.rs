// src/dag/composites.rs

//! Named composite tasks: the built-in `build` / `dev` / `bundle` / `default`
//! plus any `[composite.<name>]` sections from the config.

use std::collections::BTreeMap;

use crate::config::ConfigFile;
use crate::dag::plan::{parallel, sequence, Plan};
use crate::errors::{AssetdagError, Result};
use crate::task::{is_leaf_task, LEAF_TASKS};

pub const BUILTIN_COMPOSITES: &[&str] = &["build", "dev", "bundle", "default"];

pub fn is_builtin_composite(name: &str) -> bool {
    BUILTIN_COMPOSITES.contains(&name)
}

/// Unexpanded definition of a built-in composite.
///
/// Members that are themselves composites stay as `Plan::Task` references
/// until [`CompositeRegistry::resolve`] expands them.
fn builtin_definition(name: &str) -> Option<Plan> {
    let plan = match name {
        "build" => sequence([
            Plan::task("clean"),
            parallel([
                Plan::task("styles"),
                Plan::task("scripts"),
                Plan::task("images"),
                Plan::task("copy"),
            ]),
        ]),
        "dev" => sequence([Plan::task("build"), Plan::task("serve"), Plan::task("watch")]),
        "bundle" => sequence([Plan::task("build"), Plan::task("package")]),
        "default" => Plan::task("dev"),
        _ => return None,
    };
    Some(plan)
}

/// Lookup table from names to composite definitions.
#[derive(Debug, Clone, Default)]
pub struct CompositeRegistry {
    user: BTreeMap<String, Plan>,
}

impl CompositeRegistry {
    /// Build the registry from a validated config.
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let user = cfg
            .composites()
            .iter()
            .map(|(name, c)| {
                let plan = match (&c.sequence, &c.parallel) {
                    (Some(seq), _) => sequence(seq.iter().map(Plan::task)),
                    (None, Some(par)) => parallel(par.iter().map(Plan::task)),
                    // Rejected by validation.
                    (None, None) => sequence([]),
                };
                (name.clone(), plan)
            })
            .collect();
        Self { user }
    }

    /// All invocable names: leaf tasks, built-in composites, user composites.
    pub fn names(&self) -> Vec<String> {
        LEAF_TASKS
            .iter()
            .chain(BUILTIN_COMPOSITES.iter())
            .map(|s| s.to_string())
            .chain(self.user.keys().cloned())
            .collect()
    }

    /// Composite names only (built-in first).
    pub fn composite_names(&self) -> Vec<String> {
        BUILTIN_COMPOSITES
            .iter()
            .map(|s| s.to_string())
            .chain(self.user.keys().cloned())
            .collect()
    }

    /// Unexpanded definition of a composite, if `name` is one.
    pub fn definition(&self, name: &str) -> Option<Plan> {
        builtin_definition(name).or_else(|| self.user.get(name).cloned())
    }

    /// Resolve `name` into a plan whose leaves are all leaf tasks.
    pub fn resolve(&self, name: &str) -> Result<Plan> {
        let mut stack = Vec::new();
        self.resolve_inner(name, &mut stack)
    }

    fn resolve_inner(&self, name: &str, stack: &mut Vec<String>) -> Result<Plan> {
        if is_leaf_task(name) {
            return Ok(Plan::task(name));
        }
        if stack.iter().any(|s| s == name) {
            return Err(AssetdagError::CompositeCycle(format!(
                "cycle detected in composites involving '{}'",
                name
            )));
        }
        let definition = self
            .definition(name)
            .ok_or_else(|| AssetdagError::TaskNotFound(name.to_string()))?;

        stack.push(name.to_string());
        let expanded = self.expand(&definition, stack)?;
        stack.pop();
        Ok(expanded)
    }

    fn expand(&self, plan: &Plan, stack: &mut Vec<String>) -> Result<Plan> {
        match plan {
            Plan::Task(name) => self.resolve_inner(name, stack),
            Plan::Sequence(members) => Ok(Plan::Sequence(
                members
                    .iter()
                    .map(|m| self.expand(m, stack))
                    .collect::<Result<Vec<_>>>()?,
            )),
            Plan::Parallel(members) => Ok(Plan::Parallel(
                members
                    .iter()
                    .map(|m| self.expand(m, stack))
                    .collect::<Result<Vec<_>>>()?,
            )),
        }
    }
}
