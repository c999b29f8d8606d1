//! CLI module for ConcatX
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::adapters::AppConfig;
use crate::utils::logging::{LogFormat, LogLevel};

pub mod args;
pub mod commands;

pub use args::{ConcatArgs, PlanArgs, ProbeArgs, ProgressArgs};

/// ConcatX media joiner
///
/// Joins media files end to end with ffmpeg. Inputs whose video streams all
/// agree are stream-copied through the concat demuxer; anything else is
/// re-encoded through the concat filter.
#[derive(Parser, Debug)]
#[command(name = "joiner")]
#[command(about = "ConcatX - join media files with ffmpeg")]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: ./concatx.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Log output format
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Join media files into one output file
    Concat(ConcatArgs),
    /// Show how the files would be joined without running ffmpeg
    Plan(PlanArgs),
    /// Show the metadata gathered for media files
    Probe(ProbeArgs),
    /// Estimate completion from an ffmpeg progress file
    Progress(ProgressArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let cli = Cli::parse_from([
            "joiner",
            "--log-level",
            "trace",
            "progress",
            "p.txt",
            "--duration",
            "10",
        ]);
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.logging.level, LogLevel::Trace);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_concat_collects_inputs_in_order() {
        let cli = Cli::parse_from(["joiner", "concat", "b.mp4", "a.mp4", "-o", "out.mp4"]);
        let Commands::Concat(args) = cli.command else {
            panic!("expected concat command");
        };
        assert_eq!(args.input.inputs, vec![PathBuf::from("b.mp4"), PathBuf::from("a.mp4")]);
        assert_eq!(args.output, PathBuf::from("out.mp4"));
        assert!(!args.force);
    }
}
