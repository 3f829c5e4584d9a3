//! Deterministic naming and filesystem layout for environments.
//!
//! Pure functions only; no validation of the build tag itself. A garbage
//! tag yields a garbage-but-deterministic name.

use crate::config::Config;
use std::path::{Path, PathBuf};

/// Suffix used for the transient clone workspace instead of a build tag.
const TEMP_WORKSPACE_SUFFIX: &str = "temp";

/// Environment name for a build tag: `<prefix><tag>`.
pub fn env_name(config: &Config, build_tag: &str) -> String {
    format!("{}{}", config.env_prefix, build_tag)
}

/// Directory of a named environment under the configured root.
pub fn env_dir(config: &Config, env_name: &str) -> PathBuf {
    config.envs_root.join(env_name)
}

/// Interpreter binary inside an environment.
pub fn interpreter_path(env_dir: &Path) -> PathBuf {
    env_dir.join("bin").join("python")
}

/// Name of the transient clone workspace, shaped like an environment name
/// so it sorts next to the environments it serves.
pub fn temp_workspace_name(config: &Config) -> String {
    env_name(config, TEMP_WORKSPACE_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config::for_tests(PathBuf::from("/work/project"))
    }

    #[test]
    fn env_name_is_deterministic() {
        let config = test_config();
        assert_eq!(env_name(&config, "adb_0001"), "venv_adb_0001");
        assert_eq!(env_name(&config, "adb_0001"), env_name(&config, "adb_0001"));
    }

    #[test]
    fn env_name_does_not_validate_the_tag() {
        let config = test_config();
        assert_eq!(env_name(&config, "v1 !?"), "venv_v1 !?");
    }

    #[test]
    fn layout_is_root_name_bin_python() {
        let config = test_config();
        let dir = env_dir(&config, &env_name(&config, "adb_0001"));
        assert_eq!(dir, PathBuf::from("/work/project/venv_adb_0001"));
        assert_eq!(
            interpreter_path(&dir),
            PathBuf::from("/work/project/venv_adb_0001/bin/python")
        );
    }

    #[test]
    fn temp_workspace_shares_the_prefix() {
        let config = test_config();
        assert_eq!(temp_workspace_name(&config), "venv_temp");
    }
}
