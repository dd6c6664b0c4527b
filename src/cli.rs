// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `assetdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetdag",
    version,
    about = "Build, serve, watch and package front-end theme assets.",
    long_about = None
)]
pub struct CliArgs {
    /// Task or composite to run (`build`, `dev`, `bundle`, `styles`, ...).
    #[arg(value_name = "TASK", default_value = "default")]
    pub task: String,

    /// Production mode: no source maps, minified output.
    #[arg(long)]
    pub prod: bool,

    /// Path to the config file (TOML).
    ///
    /// Default: `Assetdag.toml` in the current working directory, or
    /// built-in defaults when that file does not exist.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the task plan, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// List available tasks and composites.
    #[arg(long)]
    pub list: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
