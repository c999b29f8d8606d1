//! Concatenation planning: strategy selection and the resulting plan

use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::TempPath;

use crate::domain::model::{ConcatStrategy, TimeSpec};

pub mod strategy;

pub use strategy::ConcatPlanner;

/// Everything needed to run one concatenation.
///
/// The plan owns its scratch files; they are deleted when the plan is
/// dropped, so whoever executes it must keep it alive until ffmpeg exits.
#[derive(Debug)]
pub struct ConcatPlan {
    /// Selected strategy
    pub strategy: ConcatStrategy,
    /// ffmpeg arguments, program name excluded
    pub args: Vec<String>,
    /// Destination file
    pub output: PathBuf,
    /// Sum of the item durations, the denominator for progress percentages
    pub expected_duration: TimeSpec,
    /// Number of joined items
    pub item_count: usize,
    progress_sink: TempPath,
    manifest: Option<TempPath>,
}

impl ConcatPlan {
    pub(crate) fn new(
        strategy: ConcatStrategy,
        args: Vec<String>,
        output: PathBuf,
        expected_duration: TimeSpec,
        item_count: usize,
        progress_sink: TempPath,
        manifest: Option<TempPath>,
    ) -> Self {
        Self {
            strategy,
            args,
            output,
            expected_duration,
            item_count,
            progress_sink,
            manifest,
        }
    }

    /// File ffmpeg reports progress to
    pub fn progress_path(&self) -> &Path {
        &self.progress_sink
    }

    /// Concat demuxer input list, only present for the demuxer strategy
    pub fn manifest_path(&self) -> Option<&Path> {
        self.manifest.as_deref()
    }

    /// Serializable view of the plan.
    ///
    /// Scratch paths in the arguments are replaced by [`PROGRESS_PLACEHOLDER`]
    /// and [`MANIFEST_PLACEHOLDER`], since the files vanish with the plan.
    pub fn summary(&self) -> PlanSummary {
        let progress = self.progress_path().to_str();
        let manifest = self.manifest_path().and_then(Path::to_str);
        let args = self
            .args
            .iter()
            .map(|arg| {
                if Some(arg.as_str()) == progress {
                    PROGRESS_PLACEHOLDER.to_string()
                } else if Some(arg.as_str()) == manifest {
                    MANIFEST_PLACEHOLDER.to_string()
                } else {
                    arg.clone()
                }
            })
            .collect();

        PlanSummary {
            strategy: self.strategy,
            item_count: self.item_count,
            expected_duration: self.expected_duration,
            output: self.output.clone(),
            args,
        }
    }
}

/// Stands in for the progress file in a [`PlanSummary`]
pub const PROGRESS_PLACEHOLDER: &str = "<progress-file>";
/// Stands in for the concat manifest in a [`PlanSummary`]
pub const MANIFEST_PLACEHOLDER: &str = "<manifest>";

/// Plan description for display and machine-readable output.
///
/// Holds no scratch paths; a real run allocates fresh ones when it starts.
#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary {
    pub strategy: ConcatStrategy,
    pub item_count: usize,
    pub expected_duration: TimeSpec,
    pub output: PathBuf,
    pub args: Vec<String>,
}
