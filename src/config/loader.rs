// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{AssetdagError, Result};

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (globs, composite graph). Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the configuration for a run.
///
/// - `Some(path)`: the file must exist.
/// - `None`: use [`default_config_path`] if present, otherwise the built-in
///   layout defaults.
pub fn load_or_default(explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(AssetdagError::ConfigError(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        return load_and_validate(path);
    }

    let path = default_config_path();
    if path.exists() {
        load_and_validate(&path)
    } else {
        debug!(path = %path.display(), "no config file found; using built-in defaults");
        ConfigFile::try_from(RawConfigFile::default())
    }
}

/// Default config location: `Assetdag.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Assetdag.toml")
}
