//! Command construction for the two concatenation strategies

use std::path::Path;

use crate::domain::errors::DomainError;

pub mod demuxer;
pub mod filter;
pub mod progress;

pub use demuxer::DemuxerCommandBuilder;
pub use filter::FilterCommandBuilder;

/// Incremental builder for an ffmpeg argument vector (program name excluded)
#[derive(Debug, Clone, Default)]
pub struct ArgumentBuilder {
    args: Vec<String>,
}

impl ArgumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append whitespace-separated flags, e.g. `"-f concat"` becomes two arguments
    pub fn flags(mut self, flags: &str) -> Self {
        self.args.extend(flags.split_whitespace().map(str::to_string));
        self
    }

    /// Append a single argument verbatim, spaces included
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several verbatim arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Vec<String> {
        self.args
    }
}

/// Render a path as a command-line argument
pub fn path_to_arg(path: &Path) -> Result<String, DomainError> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| DomainError::BadArgs(format!("Path is not valid UTF-8: {}", path.display())))
}
