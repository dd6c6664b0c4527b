// src/task/styles.rs

//! Stylesheet compilation.
//!
//! The configured compiler prints CSS on stdout. In production the output is
//! stripped of source-map comments and minified in-process with
//! `lightningcss` for a fixed legacy target (IE 11).

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use tracing::{error, info};

use crate::exec::{render_template, run_shell, TaskFuture};
use crate::task::{Pipeline, Task};
use crate::types::Mode;

pub struct StylesTask;

impl Task for StylesTask {
    fn name(&self) -> &'static str {
        "styles"
    }

    fn run<'a>(&'a self, pipeline: &'a Pipeline) -> TaskFuture<'a> {
        Box::pin(async move {
            let ctx = pipeline.context();
            let cfg = ctx.config().styles();
            let mode = ctx.mode();

            let output_rel = output_path(&cfg.entry, &cfg.dest, "css");
            let template = if mode.is_production() {
                &cfg.cmd_production
            } else {
                &cfg.cmd
            };
            let output_str = output_rel.to_string_lossy();
            let cmd = render_template(
                template,
                &[
                    ("input", cfg.entry.as_str()),
                    ("output", &*output_str),
                    ("dest", cfg.dest.as_str()),
                ],
            );

            // Compile and minify errors are reported but never fail the task,
            // so a broken stylesheet cannot take down the watch loop.
            let output = match run_shell("styles", &cmd, ctx.root()).await {
                Ok(o) => o,
                Err(e) => {
                    error!(error = %e, "stylesheet compiler could not be started");
                    return Ok(());
                }
            };
            if !output.success {
                error!(
                    exit_code = output.exit_code,
                    stderr = %output.stderr_tail(20),
                    "stylesheet compile failed; keeping previous output"
                );
                return Ok(());
            }

            let css = String::from_utf8_lossy(&output.stdout);
            let css = match finish_stylesheet(&css, mode) {
                Ok(css) => css,
                Err(e) => {
                    error!(error = %e, "stylesheet post-processing failed");
                    return Ok(());
                }
            };

            pipeline
                .fs()
                .write(&ctx.resolve(&output_rel), css.as_bytes())?;
            info!(output = ?output_rel, bytes = css.len(), %mode, "stylesheet written");

            let served = served_asset_path(&output_rel, Path::new(&ctx.config().serve().root));
            pipeline.live_reload().inject_stream(&served);
            Ok(())
        })
    }
}

/// `<dest>/<entry stem>.<ext>`.
pub(crate) fn output_path(entry: &str, dest: &str, ext: &str) -> PathBuf {
    let stem = Path::new(entry)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "main".to_string());
    Path::new(dest).join(format!("{stem}.{ext}"))
}

/// Path of an output file as the preview server exposes it.
fn served_asset_path(output: &Path, serve_root: &Path) -> String {
    output
        .strip_prefix(serve_root)
        .unwrap_or(output)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Apply the mode-specific post-processing to compiled CSS.
pub fn finish_stylesheet(css: &str, mode: Mode) -> anyhow::Result<String> {
    match mode {
        Mode::Development => Ok(css.to_string()),
        Mode::Production => minify_css(&strip_source_map_comments(css)),
    }
}

/// Remove `/*# sourceMappingURL=... */` and `//# sourceMappingURL=...` comments.
pub fn strip_source_map_comments(css: &str) -> String {
    const BLOCK: &str = "/*# sourceMappingURL=";
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find(BLOCK) {
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        match after.find("*/") {
            Some(end) => rest = &after[end + 2..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);

    out.lines()
        .filter(|line| !line.trim_start().starts_with("//# sourceMappingURL="))
        .collect::<Vec<_>>()
        .join("\n")
}

fn legacy_targets() -> Targets {
    Targets::from(Browsers {
        ie: Some(11 << 16),
        ..Browsers::default()
    })
}

/// Minify CSS for the legacy browser target.
pub fn minify_css(css: &str) -> anyhow::Result<String> {
    let mut sheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| anyhow!("parsing stylesheet: {e}"))?;
    sheet
        .minify(MinifyOptions {
            targets: legacy_targets(),
            ..MinifyOptions::default()
        })
        .map_err(|e| anyhow!("minifying stylesheet: {e}"))?;
    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            targets: legacy_targets(),
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("printing stylesheet: {e}"))?;
    Ok(printed.code)
}
