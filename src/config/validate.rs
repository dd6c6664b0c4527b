// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::dag::composites::is_builtin_composite;
use crate::errors::{AssetdagError, Result};
use crate::pathset::PathSet;
use crate::task::is_leaf_task;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::AssetdagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_transforms(cfg)?;
    validate_globs(cfg)?;
    validate_composite_members(cfg)?;
    validate_composite_graph(cfg)?;
    Ok(())
}

fn validate_transforms(cfg: &RawConfigFile) -> Result<()> {
    let required = [
        ("styles.entry", &cfg.styles.entry),
        ("styles.dest", &cfg.styles.dest),
        ("styles.cmd", &cfg.styles.cmd),
        ("styles.cmd_production", &cfg.styles.cmd_production),
        ("scripts.entry", &cfg.scripts.entry),
        ("scripts.dest", &cfg.scripts.dest),
        ("scripts.cmd", &cfg.scripts.cmd),
        ("scripts.cmd_production", &cfg.scripts.cmd_production),
        ("clean.target", &cfg.clean.target),
        ("serve.root", &cfg.serve.root),
        ("package.dest", &cfg.package.dest),
        ("watch.source_root", &cfg.watch.source_root),
    ];

    for (key, value) in required {
        if value.trim().is_empty() {
            return Err(AssetdagError::ConfigError(format!(
                "[{}] must not be empty",
                key
            )));
        }
    }

    if cfg.package.name_placeholder.is_empty() || cfg.package.version_placeholder.is_empty() {
        return Err(AssetdagError::ConfigError(
            "[package] placeholders must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_globs(cfg: &RawConfigFile) -> Result<()> {
    let sets = [
        ("images", PathSet::new(cfg.images.include.clone(), cfg.images.exclude.clone(), "")),
        ("copy", PathSet::new(cfg.copy.include.clone(), cfg.copy.exclude.clone(), "")),
        ("package", PathSet::new(cfg.package.include.clone(), cfg.package.exclude.clone(), "")),
        ("styles.watch", PathSet::new(cfg.styles.watch.clone(), Vec::new(), "")),
        ("scripts.watch", PathSet::new(cfg.scripts.watch.clone(), Vec::new(), "")),
        ("watch.templates", PathSet::new(cfg.watch.templates.clone(), Vec::new(), "")),
    ];

    for (section, set) in sets {
        set.compile().map_err(|e| {
            AssetdagError::ConfigError(format!("[{}] has an invalid pattern: {:#}", section, e))
        })?;
    }

    Ok(())
}

fn validate_composite_members(cfg: &RawConfigFile) -> Result<()> {
    for (name, composite) in cfg.composite.iter() {
        if is_leaf_task(name) || is_builtin_composite(name) {
            return Err(AssetdagError::ConfigError(format!(
                "composite '{}' shadows a built-in task",
                name
            )));
        }

        let members = match (&composite.sequence, &composite.parallel) {
            (Some(seq), None) => seq,
            (None, Some(par)) => par,
            _ => {
                return Err(AssetdagError::ConfigError(format!(
                    "composite '{}' must set exactly one of `sequence` or `parallel`",
                    name
                )));
            }
        };

        if members.is_empty() {
            return Err(AssetdagError::ConfigError(format!(
                "composite '{}' has no members",
                name
            )));
        }

        for member in members {
            let known = is_leaf_task(member)
                || is_builtin_composite(member)
                || cfg.composite.contains_key(member);
            if !known {
                return Err(AssetdagError::ConfigError(format!(
                    "composite '{}' references unknown task '{}'",
                    name, member
                )));
            }
            if member == name {
                return Err(AssetdagError::CompositeCycle(format!(
                    "composite '{}' references itself",
                    name
                )));
            }
        }
    }
    Ok(())
}

fn validate_composite_graph(cfg: &RawConfigFile) -> Result<()> {
    // Edge direction: composite -> member composite. Built-ins never refer to
    // user composites, so only user-defined nodes can take part in a cycle.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.composite.keys() {
        graph.add_node(name.as_str());
    }

    for (name, composite) in cfg.composite.iter() {
        let members = composite
            .sequence
            .iter()
            .chain(composite.parallel.iter())
            .flatten();
        for member in members {
            if cfg.composite.contains_key(member) {
                graph.add_edge(name.as_str(), member.as_str(), ());
            }
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(AssetdagError::CompositeCycle(format!(
                "cycle detected in composites involving '{}'",
                node
            )))
        }
    }
}
