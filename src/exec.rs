//! Synchronous invocation of external tools with captured output.
//!
//! Every call blocks until the child exits; the success criterion is the
//! exit status. Output is captured only for diagnostics, never streamed.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;
use std::time::Instant;

/// Captured result of one child-process invocation.
#[derive(Debug)]
pub struct ToolOutput {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Best available one-line explanation of a failure.
    pub fn detail(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        format!("exit status {}", exit_code_string(&self.status))
    }
}

/// Run `base` (program plus fixed arguments) followed by `args`, with the
/// given working directory. Resolves the program on PATH first so a
/// missing tool reads as "not found" rather than a bare spawn error.
pub fn run_tool(base: &[String], args: &[String], cwd: &Path) -> Result<ToolOutput> {
    let (program, fixed) = base
        .split_first()
        .context("external tool invocation is empty")?;
    let program = which::which(program)
        .with_context(|| format!("{program} not found on PATH"))?;

    let start = Instant::now();
    let output = Command::new(&program)
        .args(fixed)
        .args(args)
        .current_dir(cwd)
        .output()
        .with_context(|| format!("spawn {}", program.display()))?;

    tracing::debug!(
        program = %program.display(),
        args = %args.join(" "),
        status = %exit_code_string(&output.status),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "external tool finished"
    );

    Ok(ToolOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

fn exit_code_string(status: &std::process::ExitStatus) -> String {
    match status.code() {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}
