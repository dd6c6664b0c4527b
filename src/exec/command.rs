// src/exec/command.rs

//! Shell command runner for the external transforms.

use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::{debug, info};

/// Captured result of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl CommandOutput {
    /// Last few stderr lines, for error messages.
    pub fn stderr_tail(&self, lines: usize) -> String {
        let all: Vec<&str> = self.stderr.lines().collect();
        let start = all.len().saturating_sub(lines);
        all[start..].join("\n")
    }
}

/// Run `cmd` through the platform shell in `cwd` and wait for it.
///
/// Stdout is captured and returned; stderr is captured and logged at debug.
/// A non-zero exit is **not** an error here; callers decide what it means.
pub async fn run_shell(task: &str, cmd: &str, cwd: &Path) -> Result<CommandOutput> {
    info!(task = %task, cmd = %cmd, "running external command");

    // Build a shell command appropriate for the platform.
    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    command
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = command
        .output()
        .await
        .with_context(|| format!("spawning process for task '{}'", task))?;

    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    for line in stderr.lines() {
        debug!(task = %task, "stderr: {}", line);
    }

    let exit_code = output.status.code().unwrap_or(-1);
    debug!(
        task = %task,
        exit_code,
        success = output.status.success(),
        "external command exited"
    );

    Ok(CommandOutput {
        success: output.status.success(),
        exit_code,
        stdout: output.stdout,
        stderr,
    })
}

/// Substitute `{key}` placeholders in a command template.
///
/// Values containing whitespace are single-quoted for the shell.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        let needle = format!("{{{key}}}");
        out = out.replace(&needle, &shell_quote(value));
    }
    out
}

fn shell_quote(value: &str) -> String {
    if value.chars().any(char::is_whitespace) {
        format!("'{}'", value.replace('\'', r"'\''"))
    } else {
        value.to_string()
    }
}
