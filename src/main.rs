//! Edgeserver Upload - Main entry point.
//!
//! Packages a build-output directory and pushes it to an edgeserver
//! deployment endpoint. One attempt per invocation; exit code 0 on
//! success, 1 on any failure.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use edgeserver_upload::{config::DeployConfig, pipeline, utils};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML configuration file (environment variables override it)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    if let Err(e) = utils::logger::init(&args.log_level) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    tracing::info!("edgeserver-upload v{}", env!("CARGO_PKG_VERSION"));

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match pipeline::run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "deployment failed");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> edgeserver_upload::Result<DeployConfig> {
    match path {
        Some(path) => DeployConfig::from_file(path),
        None => DeployConfig::from_env(),
    }
}
