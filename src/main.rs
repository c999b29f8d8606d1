//! ConcatX media joiner
//!
//! Joins media files end to end with ffmpeg, choosing lossless stream copy
//! when every input's video stream agrees and re-encoding otherwise.
//!
//! # Usage
//!
//! ```bash
//! joiner concat part1.mp4 part2.mp4 --output joined.mp4
//! joiner plan --dir ./parts --output joined.mp4 --format json
//! joiner probe part1.mp4
//! joiner progress /tmp/concatx-pg-abc.progress --duration 00:10:00
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info};

use concatx_cli::adapters::TomlConfigAdapter;
use concatx_cli::app::DefaultAppContainer;
use concatx_cli::cli::{commands, Cli, Commands};
use concatx_cli::error::ConcatXError;
use concatx_cli::utils::logging::init_logging;
use concatx_cli::DomainError;

/// Main entry point for the ConcatX CLI application
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match TomlConfigAdapter::new(cli.config.clone()).load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    cli.apply_overrides(&mut config);

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Warning: {}", e);
    }

    info!("Starting ConcatX");
    let container = DefaultAppContainer::new(&config);

    let result = match cli.command {
        Commands::Concat(args) => commands::concat(&container, args).await,
        Commands::Plan(args) => commands::plan(&container, args).await,
        Commands::Probe(args) => commands::probe(&container, args).await,
        Commands::Progress(args) => commands::progress(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

/// Print user-facing errors verbatim and everything else behind a generic prefix
fn report_error(err: &anyhow::Error) {
    debug!(error = ?err, "Command failed");

    let user_facing = err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<DomainError>() {
            return e.is_user_facing().then(|| e.to_string());
        }
        cause
            .downcast_ref::<ConcatXError>()
            .filter(|e| e.is_user_facing())
            .map(ToString::to_string)
    });

    match user_facing {
        Some(message) => eprintln!("{}", message),
        None => eprintln!("Error: {:#}", err),
    }
}
