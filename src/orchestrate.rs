//! Top-level activate-or-provision flow.
//!
//! Verify first, provision on a miss, verify again, then notify. Every
//! failure surfaces as a bordered warning plus a boolean result; there is
//! no retry loop at this level.

use crate::config::{disable_flag_name, Config};
use crate::notify;
use crate::output;
use crate::paths;
use crate::provision;
use crate::traceback;
use crate::verify;

/// Make the environment for `build_tag` usable and tell the editor about
/// it. Returns true when the caller may proceed.
pub fn activate_or_provision(config: &Config, build_tag: &str) -> bool {
    if config.switching_disabled {
        tracing::info!(
            flag = %disable_flag_name("AUTO_BUILD_SWITCHER"),
            "automatic build switching disabled"
        );
        output::warning(&[
            "WARNING: Automatic build switching disabled.",
            "Skipping virtual environment activation.",
        ]);
        return true;
    }

    let env_name = paths::env_name(config, build_tag);
    let env_dir = paths::env_dir(config, &env_name);

    println!("Verifying '{env_name}' exists and has the '{}' package installed...", config.marker_package);
    match verify::verify(config, &env_dir) {
        Ok(true) => {}
        Ok(false) => {
            println!("Cannot activate '{env_name}'. Re-creating the virtual environment...");
            if let Err(err) = provision::provision(config, build_tag) {
                tracing::error!(error = %format!("{err:#}"), build_tag, "provisioning failed");
                output::warning_aligned(
                    &[
                        "Provisioning the virtual environment failed:",
                        &format!("{err:#}"),
                    ],
                    output::Alignment::Left,
                );
                return false;
            }
            println!("Virtual environment created, verifying...");
            match verify::verify(config, &env_dir) {
                Ok(true) => {}
                Ok(false) => {
                    output::warning(&[
                        "The freshly provisioned environment failed verification.",
                        "Not activating it.",
                    ]);
                    return false;
                }
                Err(err) => {
                    report_verify_error(&err);
                    return false;
                }
            }
        }
        Err(err) => {
            report_verify_error(&err);
            return false;
        }
    }

    if let Err(err) = traceback::configure(config, &env_dir) {
        // Cosmetic hook only; the environment stays activatable.
        tracing::warn!(error = %format!("{err:#}"), "traceback formatter configuration failed");
    }

    notify::notify(config, build_tag)
}

fn report_verify_error(err: &anyhow::Error) {
    tracing::error!(error = %format!("{err:#}"), "environment verification failed");
    output::warning_aligned(
        &[
            "Could not check the virtual environment:",
            &format!("{err:#}"),
        ],
        output::Alignment::Left,
    );
}
