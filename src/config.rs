//! Process configuration resolved once at startup.
//!
//! Every component takes a `&Config` instead of reading process-wide state,
//! so behavior in tests is controlled by constructing the struct directly.
//! Required values fail construction with a descriptive [`ConfigError`];
//! they are never silently defaulted.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Prefix for all of this tool's environment variables.
pub const VAR_PREFIX: &str = "VSW";

/// Default prefix for environment directory names.
pub const DEFAULT_ENV_PREFIX: &str = "venv_";

/// Default loopback endpoint of the editor extension.
pub const DEFAULT_NOTIFY_ENDPOINT: &str = "http://127.0.0.1:9876/set-interpreter";

/// Action discriminator sent with every activation request.
pub const NOTIFY_ACTION: &str = "set-interpreter";

const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 6;

/// Errors raised while resolving required configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {var} has an unusable value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Immutable configuration shared by every component.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory that holds all managed environments.
    pub envs_root: PathBuf,
    /// Package whose presence proves an environment was provisioned.
    pub marker_package: String,
    /// URL of the upstream prerequisites repository.
    pub prereqs_repo: String,
    /// Prefix prepended to the build tag to form an environment name.
    pub env_prefix: String,
    /// Loopback endpoint the activation notification is POSTed to.
    pub notify_endpoint: String,
    /// Bound on the whole notification round trip.
    pub notify_timeout: Duration,
    /// Installer invocation, e.g. `["uv"]`.
    pub uv: Vec<String>,
    /// Version-control invocation, e.g. `["git"]`.
    pub git: Vec<String>,
    /// Automatic build switching disabled out-of-band.
    pub switching_disabled: bool,
    /// Install the Rich traceback hook into verified environments.
    pub rich_tracebacks: bool,
}

impl Config {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Baseline configuration for unit tests, rooted at `envs_root`.
    #[cfg(test)]
    pub(crate) fn for_tests(envs_root: PathBuf) -> Self {
        Self {
            envs_root,
            marker_package: "corelib".to_string(),
            prereqs_repo: "https://example.com/prereqs.git".to_string(),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            notify_endpoint: DEFAULT_NOTIFY_ENDPOINT.to_string(),
            notify_timeout: Duration::from_secs(DEFAULT_NOTIFY_TIMEOUT_SECS),
            uv: vec!["uv".to_string()],
            git: vec!["git".to_string()],
            switching_disabled: false,
            rich_tracebacks: false,
        }
    }

    /// Resolve configuration through an explicit lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let envs_root = PathBuf::from(required(&lookup, "VSW_ENVS_ROOT")?);
        let marker_package = required(&lookup, "VSW_MARKER_PACKAGE")?;
        let prereqs_repo = required(&lookup, "VSW_PREREQS_REPO")?;

        let env_prefix =
            optional(&lookup, "VSW_ENV_PREFIX").unwrap_or_else(|| DEFAULT_ENV_PREFIX.to_string());
        let notify_endpoint = optional(&lookup, "VSW_NOTIFY_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_NOTIFY_ENDPOINT.to_string());
        let notify_timeout = match optional(&lookup, "VSW_NOTIFY_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|err| ConfigError::Invalid {
                    var: "VSW_NOTIFY_TIMEOUT_SECS",
                    value: raw.clone(),
                    reason: err.to_string(),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_NOTIFY_TIMEOUT_SECS),
        };

        let uv = tool_invocation(&lookup, "VSW_UV_BIN", "uv")?;
        let git = tool_invocation(&lookup, "VSW_GIT_BIN", "git")?;

        Ok(Self {
            envs_root,
            marker_package,
            prereqs_repo,
            env_prefix,
            notify_endpoint,
            notify_timeout,
            uv,
            git,
            switching_disabled: feature_disabled(&lookup, "AUTO_BUILD_SWITCHER"),
            rich_tracebacks: lookup("VSW_RICH_TRACEBACKS").is_some(),
        })
    }
}

/// Name of the variable that disables a feature when present.
pub fn disable_flag_name(feature: &str) -> String {
    format!("{VAR_PREFIX}_{feature}_DISABLED")
}

/// A feature is disabled by the mere presence of its flag, any value.
fn feature_disabled<F>(lookup: &F, feature: &str) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let variable = disable_flag_name(feature);
    let disabled = lookup(&variable).is_some();
    tracing::debug!(variable = %variable, disabled, "checked feature flag");
    disabled
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|value| !value.trim().is_empty())
}

/// Parse a tool override like `"/opt/uv/bin/uv --offline"` into argv form.
fn tool_invocation<F>(
    lookup: &F,
    var: &'static str,
    fallback: &str,
) -> Result<Vec<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = optional(lookup, var) else {
        return Ok(vec![fallback.to_string()]);
    };
    let parts = shell_words::split(&raw).map_err(|err| ConfigError::Invalid {
        var,
        value: raw.clone(),
        reason: err.to_string(),
    })?;
    if parts.is_empty() {
        return Err(ConfigError::Invalid {
            var,
            value: raw,
            reason: "empty command".to_string(),
        });
    }
    Ok(parts)
}
