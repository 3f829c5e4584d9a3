//! Environment usability checks.
//!
//! The sole gate for "is this environment usable": the interpreter binary
//! must exist and the marker package must be installed. Absence of either
//! is an expected miss, not an error, and never triggers deletion here --
//! an environment directory may exist for reasons this tool does not know
//! about.

use crate::config::Config;
use crate::exec;
use crate::paths;
use anyhow::Result;
use std::path::Path;

/// Check whether the environment at `env_dir` is usable.
///
/// `Ok(false)` covers every expected miss (no directory, no interpreter,
/// marker package not installed). `Err` is reserved for the inspection
/// command itself being unrunnable, which the caller must treat as fatal:
/// "can't check" must never be read as "not installed".
pub fn verify(config: &Config, env_dir: &Path) -> Result<bool> {
    let python = paths::interpreter_path(env_dir);
    if !python.exists() {
        println!("Virtual environment not found at: {}", env_dir.display());
        return Ok(false);
    }

    let args = vec![
        "pip".to_string(),
        "show".to_string(),
        "-p".to_string(),
        python.display().to_string(),
        config.marker_package.clone(),
    ];
    let output = exec::run_tool(&config.uv, &args, &config.envs_root)?;
    if !output.success() {
        println!(
            "Prerequisite package '{}' not found in virtual environment: {}",
            config.marker_package,
            output.detail()
        );
        return Ok(false);
    }

    tracing::debug!(env_dir = %env_dir.display(), "environment verified");
    Ok(true)
}
