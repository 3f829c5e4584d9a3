//! Optional Rich traceback hook for verified environments.
//!
//! When `VSW_RICH_TRACEBACKS` is present, a `sitecustomize.py` inside the
//! environment installs the Rich traceback handler for every interpreter
//! start; when absent, a previously installed hook is removed again. This
//! runs after verification and must never fail an activation: the
//! environment is usable either way.

use crate::config::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const HOOK_IMPORT: &str = "from rich.traceback import install";
const HOOK_INSTALL: &str = "install(show_locals=True)";

/// Install or remove the traceback hook according to configuration.
pub fn configure(config: &Config, env_dir: &Path) -> Result<()> {
    println!("Configuring Rich formatter...");

    let Some(site_packages) = find_site_packages(env_dir)? else {
        println!(
            "Warning: Could not find site-packages directory in virtual environment - cannot configure the Rich traceback formatter"
        );
        return Ok(());
    };
    let customize_file = site_packages.join("sitecustomize.py");

    if config.rich_tracebacks {
        enable_hook(&customize_file)
    } else {
        disable_hook(&customize_file)
    }
}

/// First `lib/python*/site-packages` directory inside the environment.
fn find_site_packages(env_dir: &Path) -> Result<Option<PathBuf>> {
    let lib_dir = env_dir.join("lib");
    if !lib_dir.is_dir() {
        return Ok(None);
    }
    let mut candidates = Vec::new();
    for entry in fs::read_dir(&lib_dir).with_context(|| format!("read {}", lib_dir.display()))? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if name.starts_with("python") {
            let site_packages = path.join("site-packages");
            if site_packages.is_dir() {
                candidates.push(site_packages);
            }
        }
    }
    candidates.sort();
    Ok(candidates.into_iter().next())
}

fn enable_hook(customize_file: &Path) -> Result<()> {
    let mut content = String::new();
    if customize_file.exists() {
        content = fs::read_to_string(customize_file)
            .with_context(|| format!("read {}", customize_file.display()))?;
        if content.contains(HOOK_IMPORT) {
            println!("Rich traceback formatter is enabled");
            return Ok(());
        }
        content = format!("{}\n\n", content.trim_end());
    }
    content.push_str(&format!("{HOOK_IMPORT}\n{HOOK_INSTALL}\n"));
    fs::write(customize_file, content)
        .with_context(|| format!("write {}", customize_file.display()))?;
    println!("Rich traceback formatter has been enabled");
    Ok(())
}

fn disable_hook(customize_file: &Path) -> Result<()> {
    if !customize_file.exists() {
        println!("Rich traceback formatter is not enabled.");
        return Ok(());
    }
    let content = fs::read_to_string(customize_file)
        .with_context(|| format!("read {}", customize_file.display()))?;

    let mut found_hook = false;
    let kept: Vec<&str> = content
        .lines()
        .filter(|line| {
            let is_hook = line.contains("rich.traceback") || line.contains(HOOK_INSTALL);
            found_hook |= is_hook;
            !is_hook
        })
        .collect();

    if !found_hook {
        println!("Rich traceback formatter was not enabled in the first place.");
        return Ok(());
    }

    let remainder = kept.join("\n");
    if remainder.trim().is_empty() {
        fs::remove_file(customize_file)
            .with_context(|| format!("remove {}", customize_file.display()))?;
    } else {
        fs::write(customize_file, remainder)
            .with_context(|| format!("write {}", customize_file.display()))?;
    }
    println!("Rich traceback formatter has been disabled.");
    Ok(())
}
