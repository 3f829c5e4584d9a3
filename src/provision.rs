//! Environment provisioning with compensating rollback.
//!
//! One provisioning attempt is a linear state machine: validate the build
//! tag by cloning it, create the environment, discover artifacts, install
//! them. The tag is validated before anything is created so a nonexistent
//! tag never leaves an empty, misleadingly named environment behind. On
//! any later failure the half-built environment is removed entirely; the
//! clone workspace is removed on every exit path.

use crate::config::Config;
use crate::exec;
use crate::packages;
use crate::paths;
use anyhow::{anyhow, bail, Context, Result};
use std::path::{Path, PathBuf};

/// Transient clone of the prerequisites repository for one attempt.
///
/// Owns the directory for its whole lifetime; dropping the guard removes
/// whatever is on disk, so every exit path cleans up.
struct CloneWorkspace {
    path: PathBuf,
}

impl CloneWorkspace {
    /// Reserve the workspace location, clearing any stale leftover from a
    /// previous interrupted run.
    fn reserve(config: &Config) -> Result<Self> {
        let path = config.envs_root.join(paths::temp_workspace_name(config));
        if path.exists() {
            println!("Removing old temp directory...");
            std::fs::remove_dir_all(&path)
                .with_context(|| format!("remove stale {}", path.display()))?;
        }
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn dir_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl Drop for CloneWorkspace {
    fn drop(&mut self) {
        if self.path.exists() {
            println!("Cleaning up temporary files...");
            if let Err(err) = std::fs::remove_dir_all(&self.path) {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "failed to remove clone workspace"
                );
            }
        }
    }
}

/// Provision the environment for `build_tag` from the upstream snapshot.
///
/// Returns an error for every failure mode; the caller decides how to
/// surface it. After an error there is no environment directory and no
/// clone workspace on disk.
pub fn provision(config: &Config, build_tag: &str) -> Result<()> {
    let env_name = paths::env_name(config, build_tag);
    let env_dir = paths::env_dir(config, &env_name);

    let workspace = CloneWorkspace::reserve(config)?;
    clone_tagged_snapshot(config, build_tag, &workspace)?;

    if let Err(err) = build_environment(config, &env_name, &env_dir, workspace.path()) {
        remove_dir_tree(&env_dir, "Cleaning up failed virtual environment...");
        return Err(err);
    }
    Ok(())
}

/// Shallow single-branch clone of the tag into the workspace. A clone
/// failure means the tag does not exist upstream; nothing has been created
/// yet at that point.
fn clone_tagged_snapshot(
    config: &Config,
    build_tag: &str,
    workspace: &CloneWorkspace,
) -> Result<()> {
    println!("Validating build tag {build_tag}...");
    let args = vec![
        "clone".to_string(),
        "--depth".to_string(),
        "1".to_string(),
        "--single-branch".to_string(),
        "--branch".to_string(),
        build_tag.to_string(),
        config.prereqs_repo.clone(),
        workspace.dir_name(),
    ];
    let output = exec::run_tool(&config.git, &args, &config.envs_root)?;
    if !output.success() {
        println!("Error: Build tag '{build_tag}' does not exist in the prerequisites repository.");
        return Err(anyhow!(
            "build tag '{build_tag}' not found upstream: {}",
            output.detail()
        ));
    }
    Ok(())
}

fn build_environment(
    config: &Config,
    env_name: &str,
    env_dir: &Path,
    workspace: &Path,
) -> Result<()> {
    println!("Creating virtual environment '{env_name}'...");
    let args = vec![
        "venv".to_string(),
        "--system-site-packages".to_string(),
        env_name.to_string(),
    ];
    let output = exec::run_tool(&config.uv, &args, &config.envs_root)?;
    if !output.success() {
        bail!("create virtual environment failed: {}", output.detail());
    }

    let python = paths::interpreter_path(env_dir);
    let artifacts = packages::discover(workspace)?;
    packages::install_all(config, &python, &artifacts)
        .with_context(|| format!("install prerequisites for '{env_name}'"))?;
    Ok(())
}

/// Best-effort recursive removal, announced when the directory exists.
fn remove_dir_tree(dir: &Path, message: &str) -> bool {
    if !dir.exists() {
        return false;
    }
    println!("{message}");
    if let Err(err) = std::fs::remove_dir_all(dir) {
        tracing::warn!(path = %dir.display(), error = %err, "failed to remove directory");
        return false;
    }
    true
}
