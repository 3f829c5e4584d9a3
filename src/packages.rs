//! Install-artifact discovery and installation.
//!
//! A cloned prerequisites snapshot carries two kinds of installable
//! artifacts at its top level: built wheels and requirements files. Both
//! sets may be empty; a zero-length install is valid.

use crate::config::Config;
use crate::exec;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Installable files found in a clone workspace, partitioned by kind.
#[derive(Debug, Default)]
pub struct InstallArtifacts {
    pub wheels: Vec<PathBuf>,
    pub requirements: Vec<PathBuf>,
}

impl InstallArtifacts {
    pub fn is_empty(&self) -> bool {
        self.wheels.is_empty() && self.requirements.is_empty()
    }
}

/// Scan the top level of `workspace` for wheels and requirements files.
/// Results are sorted for a deterministic install order.
pub fn discover(workspace: &Path) -> Result<InstallArtifacts> {
    let mut artifacts = InstallArtifacts::default();
    let entries = std::fs::read_dir(workspace)
        .with_context(|| format!("read {}", workspace.display()))?;
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if name.ends_with(".whl") {
            artifacts.wheels.push(path);
        } else if name.starts_with("requirements") && name.ends_with(".txt") {
            artifacts.requirements.push(path);
        }
    }
    artifacts.wheels.sort();
    artifacts.requirements.sort();
    tracing::debug!(
        wheels = artifacts.wheels.len(),
        requirements = artifacts.requirements.len(),
        "discovered install artifacts"
    );
    Ok(artifacts)
}

/// Install everything into the environment owning `python`: wheels first,
/// then requirements files. The first failing step aborts the rest.
pub fn install_all(config: &Config, python: &Path, artifacts: &InstallArtifacts) -> Result<()> {
    install_files(config, python, &artifacts.wheels, None)?;
    install_files(config, python, &artifacts.requirements, Some("-r"))?;
    Ok(())
}

fn install_files(
    config: &Config,
    python: &Path,
    files: &[PathBuf],
    requirements_flag: Option<&str>,
) -> Result<()> {
    if files.is_empty() {
        return Ok(());
    }
    let kind = if requirements_flag.is_some() {
        "requirements"
    } else {
        "wheel"
    };
    println!("Installing {kind} files...");

    for file in files {
        let mut args = vec!["pip".to_string(), "install".to_string()];
        if let Some(flag) = requirements_flag {
            args.push(flag.to_string());
        }
        args.push("-p".to_string());
        args.push(python.display().to_string());
        args.push(file.display().to_string());

        let output = exec::run_tool(&config.uv, &args, &config.envs_root)?;
        if !output.success() {
            let name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());
            bail!("install {name} failed: {}", output.detail());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn discovery_partitions_by_kind_and_sorts() {
        let workspace = TempDir::new().unwrap();
        for name in [
            "pkg_b-1.0-py3-none-any.whl",
            "pkg_a-1.0-py3-none-any.whl",
            "requirements.txt",
            "requirements-dev.txt",
            "README.md",
            "notes.txt",
        ] {
            fs::write(workspace.path().join(name), "").unwrap();
        }

        let artifacts = discover(workspace.path()).unwrap();
        let wheels: Vec<_> = artifacts
            .wheels
            .iter()
            .map(|path| path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            wheels,
            vec!["pkg_a-1.0-py3-none-any.whl", "pkg_b-1.0-py3-none-any.whl"]
        );
        let requirements: Vec<_> = artifacts
            .requirements
            .iter()
            .map(|path| path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(requirements, vec!["requirements-dev.txt", "requirements.txt"]);
    }

    #[test]
    fn empty_workspace_yields_empty_artifacts() {
        let workspace = TempDir::new().unwrap();
        let artifacts = discover(workspace.path()).unwrap();
        assert!(artifacts.is_empty());
    }

    #[test]
    fn subdirectories_are_not_scanned() {
        let workspace = TempDir::new().unwrap();
        let nested = workspace.path().join("dist");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("pkg-1.0-py3-none-any.whl"), "").unwrap();
        let artifacts = discover(workspace.path()).unwrap();
        assert!(artifacts.is_empty());
    }

    #[test]
    fn zero_length_install_is_valid() {
        let root = TempDir::new().unwrap();
        let config = Config::for_tests(root.path().to_path_buf());
        let artifacts = InstallArtifacts::default();
        // No installer invocation happens, so the stub-free config is fine.
        install_all(&config, Path::new("/nonexistent/python"), &artifacts).unwrap();
    }
}
