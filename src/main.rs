use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod config;
mod exec;
mod notify;
mod orchestrate;
mod output;
mod packages;
mod paths;
mod provision;
mod traceback;
mod verify;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "vsw",
    version,
    about = "Activate or build a virtual environment for a specific build tag"
)]
struct Cli {
    /// The code build tag to activate
    build_tag: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            output::warning_aligned(&[&err.to_string()], output::Alignment::Left);
            return ExitCode::FAILURE;
        }
    };

    if orchestrate::activate_or_provision(&config, &cli.build_tag) {
        println!("\nSuccess. Virtual environment activated.");
        ExitCode::SUCCESS
    } else {
        output::warning_aligned(
            &[
                "Failed to activate the virtual environment required for this build tag.",
                "Please contact support.",
            ],
            output::Alignment::Left,
        );
        ExitCode::FAILURE
    }
}
