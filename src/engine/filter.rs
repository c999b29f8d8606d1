//! Concat filter command (re-encode)

use std::path::Path;

use tempfile::TempPath;

use crate::domain::errors::DomainError;
use crate::domain::model::{ConcatStrategy, Concatenable, TimeSpec};
use crate::engine::{path_to_arg, ArgumentBuilder};
use crate::planner::ConcatPlan;

/// Input stream index taken as each item's video
pub const VIDEO_STREAM: usize = 0;
/// Input stream index taken as each item's audio
pub const AUDIO_STREAM: usize = 1;
/// Output pad carrying the joined video
pub const VIDEO_PAD: &str = "[v]";
/// Output pad carrying the joined audio
pub const AUDIO_PAD: &str = "[a]";

/// Builds the general-path command: every item is an input of a `concat` filter graph.
///
/// Each item contributes stream 0 as video and stream 1 as audio; any other
/// streams are ignored. Output is re-encoded, so this is only used when the
/// demuxer path is ruled out.
pub struct FilterCommandBuilder;

impl FilterCommandBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build<I: Concatenable>(
        &self,
        output: &Path,
        progress_sink: TempPath,
        items: &[I],
        duration: TimeSpec,
    ) -> Result<ConcatPlan, DomainError> {
        // Inputs and their stream references come out of the same pass so
        // that `[i:_]` always points at the i-th `-i`.
        let mut inputs = Vec::with_capacity(items.len() * 2);
        let mut references = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            inputs.push("-i".to_string());
            inputs.push(path_to_arg(item.path())?);
            references.push(format!("[{i}:{VIDEO_STREAM}] [{i}:{AUDIO_STREAM}]"));
        }

        let graph = format!(
            "{} concat=n={}:v=1:a=1 {} {}",
            references.join(" "),
            items.len(),
            VIDEO_PAD,
            AUDIO_PAD
        );

        /* ffmpeg -y -strict experimental -progress <sink> -i <a> -i <b> \
             -filter_complex '[0:0] [0:1] [1:0] [1:1] concat=n=2:v=1:a=1 [v] [a]' \
             -map [v] -map [a] -strict experimental <output> */
        let args = ArgumentBuilder::new()
            .flags("-y") // Overwrite output file if it exists
            .flags("-strict experimental") // Experimental decoders
            .flags("-progress")
            .arg(path_to_arg(&progress_sink)?)
            .args(inputs)
            .flags("-filter_complex")
            .arg(graph)
            .flags("-map")
            .arg(VIDEO_PAD)
            .flags("-map")
            .arg(AUDIO_PAD)
            .flags("-strict experimental") // Experimental encoders
            .arg(path_to_arg(output)?)
            .build();

        Ok(ConcatPlan::new(
            ConcatStrategy::Filter,
            args,
            output.to_path_buf(),
            duration,
            items.len(),
            progress_sink,
            None,
        ))
    }
}

impl Default for FilterCommandBuilder {
    fn default() -> Self {
        Self::new()
    }
}
