// src/project.rs

//! Project descriptor: the `name` / `version` pair the package task stamps
//! into the theme.

use std::path::Path;

use serde::Deserialize;

use crate::config::ProjectSection;
use crate::errors::{AssetdagError, Result};
use crate::fs::FileSystem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    name: Option<String>,
    version: Option<String>,
}

impl ProjectDescriptor {
    /// Read the descriptor JSON under `root`, applying config overrides.
    ///
    /// When both `name` and `version` are overridden the file is not read.
    pub fn load(fs: &dyn FileSystem, root: &Path, section: &ProjectSection) -> Result<Self> {
        let (name, version) = match (&section.name, &section.version) {
            (Some(name), Some(version)) => (Some(name.clone()), Some(version.clone())),
            (name_override, version_override) => {
                let raw = read_descriptor(fs, &root.join(&section.descriptor))?;
                (
                    name_override.clone().or(raw.name),
                    version_override.clone().or(raw.version),
                )
            }
        };

        Ok(Self {
            name: require(name, "name", &section.descriptor)?,
            version: require(version, "version", &section.descriptor)?,
        })
    }
}

fn read_descriptor(fs: &dyn FileSystem, path: &Path) -> Result<RawDescriptor> {
    let bytes = fs
        .read(path)
        .map_err(|e| AssetdagError::DescriptorError(format!("{e:#}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AssetdagError::DescriptorError(format!("{}: {e}", path.display())))
}

fn require(value: Option<String>, field: &str, descriptor: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AssetdagError::DescriptorError(format!(
            "'{field}' is missing or empty in {descriptor}"
        ))),
    }
}
