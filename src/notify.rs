//! Editor activation notification over loopback HTTP.
//!
//! Best-effort, single-shot: one POST to the extension's local endpoint,
//! one bounded wait for the answer, no retry. The extension is a
//! cooperating but independently failing process; a failed notification
//! never invalidates the environment that was just verified or built.

use crate::config::{Config, NOTIFY_ACTION};
use crate::paths;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use ureq::Agent;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActivationRequest {
    action: &'static str,
    python_path: String,
    short_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivationResponse {
    success: bool,
    #[serde(default)]
    requested_path: Option<String>,
}

/// Tell the editor extension which interpreter to use for `build_tag`.
///
/// Returns false on any failure: unreachable endpoint, timeout, non-200
/// status, malformed body, or an explicit refusal. All failures are
/// reported to the user; none of them touch the environment on disk.
pub fn notify(config: &Config, build_tag: &str) -> bool {
    let env_name = paths::env_name(config, build_tag);
    let env_dir = paths::env_dir(config, &env_name);
    let python = paths::interpreter_path(&env_dir);
    println!("Trying to switch python interpreter to: {}", python.display());

    let request = ActivationRequest {
        action: NOTIFY_ACTION,
        python_path: python.display().to_string(),
        short_name: env_name,
    };

    match send_request(config, &request) {
        Ok(effective_path) => {
            let path = effective_path.unwrap_or(request.python_path);
            println!("Editor python interpreter set to: {path}");
            true
        }
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "activation notification failed");
            println!("Communication with the editor extension failed: {err:#}");
            println!("Is the extension installed and running?");
            false
        }
    }
}

/// One request/response exchange. Returns the effective path the remote
/// side reports, when it reports one.
fn send_request(config: &Config, request: &ActivationRequest) -> Result<Option<String>> {
    let agent: Agent = Agent::config_builder()
        .timeout_global(Some(config.notify_timeout))
        .http_status_as_error(false)
        .build()
        .into();

    let mut response = agent
        .post(config.notify_endpoint.as_str())
        .send_json(request)
        .with_context(|| format!("send activation request to {}", config.notify_endpoint))?;

    let status = response.status();
    if status.as_u16() != 200 {
        bail!("endpoint answered with status {status}");
    }

    let body = response
        .body_mut()
        .read_to_string()
        .context("read activation response")?;
    if body.trim().is_empty() {
        // A bare 200 is a valid acknowledgement.
        return Ok(None);
    }

    let parsed: ActivationResponse =
        serde_json::from_str(&body).context("malformed activation response")?;
    if !parsed.success {
        bail!("extension refused the interpreter switch");
    }
    Ok(parsed.requested_path)
}
