// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::pathset::PathSet;

/// Top-level configuration as read from `Assetdag.toml`.
///
/// Every section is optional; an empty file describes the stock theme
/// layout:
///
/// ```toml
/// [styles]
/// entry = "src/sass/main.scss"
/// dest = "dist/css"
///
/// [scripts]
/// entry = "src/js/bundle.js"
/// dest = "dist/js"
///
/// [composite.assets]
/// parallel = ["styles", "scripts"]
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub project: ProjectSection,

    #[serde(default)]
    pub styles: StylesSection,

    #[serde(default)]
    pub scripts: ScriptsSection,

    #[serde(default)]
    pub images: ImagesSection,

    #[serde(default)]
    pub copy: CopySection,

    #[serde(default)]
    pub package: PackageSection,

    #[serde(default)]
    pub clean: CleanSection,

    #[serde(default)]
    pub serve: ServeSection,

    #[serde(default)]
    pub watch: WatchSection,

    /// User composites from `[composite.<name>]`.
    #[serde(default)]
    pub composite: BTreeMap<String, CompositeConfig>,
}

/// Validated configuration.
///
/// Only constructed through `TryFrom<RawConfigFile>` (see `validate.rs`), so
/// holders can rely on globs compiling and composites being acyclic.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    raw: RawConfigFile,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self { raw }
    }

    pub fn project(&self) -> &ProjectSection {
        &self.raw.project
    }

    pub fn styles(&self) -> &StylesSection {
        &self.raw.styles
    }

    pub fn scripts(&self) -> &ScriptsSection {
        &self.raw.scripts
    }

    pub fn images(&self) -> PathSet {
        let s = &self.raw.images;
        PathSet::new(s.include.clone(), s.exclude.clone(), s.dest.clone())
    }

    pub fn copy(&self) -> PathSet {
        let s = &self.raw.copy;
        PathSet::new(s.include.clone(), s.exclude.clone(), s.dest.clone())
    }

    pub fn package(&self) -> &PackageSection {
        &self.raw.package
    }

    pub fn package_paths(&self) -> PathSet {
        let s = &self.raw.package;
        PathSet::new(s.include.clone(), s.exclude.clone(), s.dest.clone())
    }

    pub fn clean(&self) -> &CleanSection {
        &self.raw.clean
    }

    pub fn serve(&self) -> &ServeSection {
        &self.raw.serve
    }

    pub fn watch(&self) -> &WatchSection {
        &self.raw.watch
    }

    pub fn composites(&self) -> &BTreeMap<String, CompositeConfig> {
        &self.raw.composite
    }
}

/// `[project]` section: where the name/version pair comes from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectSection {
    /// JSON file with `name` and `version` fields.
    pub descriptor: String,
    /// Overrides the descriptor's `name`.
    pub name: Option<String>,
    /// Overrides the descriptor's `version`.
    pub version: Option<String>,
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            descriptor: "package.json".to_string(),
            name: None,
            version: None,
        }
    }
}

/// `[styles]` section.
///
/// `cmd` runs in development mode and `cmd_production` in production mode.
/// Both must print the compiled stylesheet on stdout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StylesSection {
    pub entry: String,
    pub dest: String,
    pub cmd: String,
    pub cmd_production: String,
    pub watch: Vec<String>,
}

impl Default for StylesSection {
    fn default() -> Self {
        Self {
            entry: "src/sass/main.scss".to_string(),
            dest: "dist/css".to_string(),
            cmd: "sass --embed-source-map {input}".to_string(),
            cmd_production: "sass --no-source-map {input}".to_string(),
            watch: vec!["src/sass/**/*.scss".to_string()],
        }
    }
}

/// `[scripts]` section.
///
/// The bundler is expected to write `{output}` itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScriptsSection {
    pub entry: String,
    pub dest: String,
    pub cmd: String,
    pub cmd_production: String,
    pub watch: Vec<String>,
}

impl Default for ScriptsSection {
    fn default() -> Self {
        Self {
            entry: "src/js/bundle.js".to_string(),
            dest: "dist/js".to_string(),
            cmd: "esbuild {input} --bundle --sourcemap --target=es2015 --outfile={output}"
                .to_string(),
            cmd_production:
                "esbuild {input} --bundle --minify --target=es2015 --outfile={output}"
                    .to_string(),
            watch: vec!["src/js/**/*.js".to_string()],
        }
    }
}

/// `[images]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImagesSection {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub dest: String,
}

impl Default for ImagesSection {
    fn default() -> Self {
        Self {
            include: vec!["src/images/**/*.{jpg,jpeg,png,svg,gif}".to_string()],
            exclude: Vec::new(),
            dest: "dist/images".to_string(),
        }
    }
}

/// `[copy]` section: everything under `src/` the other transforms don't own.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CopySection {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub dest: String,
}

impl Default for CopySection {
    fn default() -> Self {
        Self {
            include: vec!["src/**/*".to_string()],
            exclude: vec![
                "src/{images,js,sass}".to_string(),
                "src/{images,js,sass}/**/*".to_string(),
            ],
            dest: "dist".to_string(),
        }
    }
}

/// `[package]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PackageSection {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Staging directory the archive is written to.
    pub dest: String,
    pub name_placeholder: String,
    pub version_placeholder: String,
}

impl Default for PackageSection {
    fn default() -> Self {
        let exclude = [
            "node_modules",
            "node_modules/**",
            "packaged",
            "packaged/**",
            ".git",
            ".git/**",
            "src",
            "src/**",
            "target",
            "target/**",
            ".gitignore",
            "Assetdag.toml",
            "package.json",
            "package-lock.json",
        ];
        Self {
            include: vec!["**/*".to_string()],
            exclude: exclude.iter().map(|s| s.to_string()).collect(),
            dest: "packaged".to_string(),
            name_placeholder: "_themename".to_string(),
            version_placeholder: "_version".to_string(),
        }
    }
}

/// `[clean]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CleanSection {
    /// Output root removed by `clean`.
    pub target: String,
}

impl Default for CleanSection {
    fn default() -> Self {
        Self {
            target: "dist".to_string(),
        }
    }
}

/// `[serve]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServeSection {
    pub host: String,
    /// `0` picks an ephemeral port.
    pub port: u16,
    /// Directory served over HTTP.
    pub root: String,
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            root: "dist".to_string(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchSection {
    /// Directory observed recursively by the file watcher.
    pub source_root: String,
    /// Server-side templates: a change only reloads connected browsers.
    pub templates: Vec<String>,
    /// Whether the `images` and `other` bindings reload after copying.
    pub reload_after_copy: bool,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            source_root: "src".to_string(),
            templates: vec!["src/**/*.php".to_string(), "src/**/*.html".to_string()],
            reload_after_copy: true,
        }
    }
}

/// `[composite.<name>]` section.
///
/// Exactly one of `sequence` / `parallel` must be set.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CompositeConfig {
    #[serde(default)]
    pub sequence: Option<Vec<String>>,
    #[serde(default)]
    pub parallel: Option<Vec<String>>,
}
