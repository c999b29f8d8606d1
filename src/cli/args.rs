//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::domain::model::TimeSpec;

/// Input files shared by the commands that join media
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Media files, joined in the order given
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Directory whose media files are appended after INPUTs, sorted by name
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

/// Arguments for the concat command
#[derive(Args, Debug)]
pub struct ConcatArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output file path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Overwrite a non-empty output file
    #[arg(long)]
    pub force: bool,

    /// Report progress as JSON lines on stdout
    #[arg(long)]
    pub json: bool,

    /// Show scratch file paths and ffmpeg's stderr on failure
    #[arg(short, long)]
    pub verbose: bool,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output file path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Media files to probe
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the progress command
#[derive(Args, Debug)]
pub struct ProgressArgs {
    /// Progress file written by ffmpeg's -progress option
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Expected output duration (HH:MM:SS.ms, MM:SS.ms, or seconds)
    #[arg(long, value_parser = parse_time)]
    pub duration: TimeSpec,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Report format for the plan command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

fn parse_time(value: &str) -> Result<TimeSpec, String> {
    TimeSpec::parse(value).map_err(|e| e.to_string())
}
