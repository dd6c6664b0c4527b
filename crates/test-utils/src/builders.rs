#![allow(dead_code)]

use assetdag::config::{CompositeConfig, ConfigFile, RawConfigFile};
use assetdag::errors::Result;

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from the built-in defaults; every setter overrides one field.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    /// Replace the stylesheet commands (both modes) with `cmd`.
    pub fn styles_cmd(mut self, dev: &str, prod: &str) -> Self {
        self.config.styles.cmd = dev.to_string();
        self.config.styles.cmd_production = prod.to_string();
        self
    }

    pub fn scripts_cmd(mut self, dev: &str, prod: &str) -> Self {
        self.config.scripts.cmd = dev.to_string();
        self.config.scripts.cmd_production = prod.to_string();
        self
    }

    pub fn project(mut self, name: &str, version: &str) -> Self {
        self.config.project.name = Some(name.to_string());
        self.config.project.version = Some(version.to_string());
        self
    }

    pub fn serve_port(mut self, port: u16) -> Self {
        self.config.serve.port = port;
        self
    }

    pub fn reload_after_copy(mut self, val: bool) -> Self {
        self.config.watch.reload_after_copy = val;
        self
    }

    pub fn sequence(mut self, name: &str, members: &[&str]) -> Self {
        self.config.composite.insert(
            name.to_string(),
            CompositeConfig {
                sequence: Some(members.iter().map(|s| s.to_string()).collect()),
                parallel: None,
            },
        );
        self
    }

    pub fn parallel(mut self, name: &str, members: &[&str]) -> Self {
        self.config.composite.insert(
            name.to_string(),
            CompositeConfig {
                sequence: None,
                parallel: Some(members.iter().map(|s| s.to_string()).collect()),
            },
        );
        self
    }

    /// Direct access for fields without a dedicated setter.
    pub fn with(mut self, f: impl FnOnce(&mut RawConfigFile)) -> Self {
        f(&mut self.config);
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn try_build(self) -> Result<ConfigFile> {
        ConfigFile::try_from(self.config)
    }

    pub fn build(self) -> ConfigFile {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
