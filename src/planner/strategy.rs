//! Concatenation strategy planning

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::errors::DomainError;
use crate::domain::model::{ConcatRequest, ConcatStrategy, Concatenable};
use crate::domain::rules::{RequestValidator, StrategySelector};
use crate::engine::{DemuxerCommandBuilder, FilterCommandBuilder};
use crate::planner::ConcatPlan;
use crate::ports::{ScratchKind, ScratchPort};

/// Turns a concatenation request into a ready-to-run plan.
///
/// Planning is synchronous and never starts ffmpeg.
pub struct ConcatPlanner {
    scratch: Arc<dyn ScratchPort>,
}

impl ConcatPlanner {
    /// Create a planner that allocates its scratch files through `scratch`
    pub fn new(scratch: Arc<dyn ScratchPort>) -> Self {
        Self { scratch }
    }

    /// Validate the request, pick a strategy and build its command.
    ///
    /// Validation covers every item (state and manifest-safe path) before
    /// any scratch file is created, so a rejected request leaves nothing on disk.
    pub fn plan<I: Concatenable>(
        &self,
        request: &ConcatRequest<I>,
    ) -> Result<ConcatPlan, DomainError> {
        info!(
            "Planning concatenation of {} items into {}",
            request.items.len(),
            request.output.display()
        );

        let duration = RequestValidator::validate(&request.items)?;
        RequestValidator::check_paths(&request.items)?;
        let decision = StrategySelector::select(&request.items);
        info!(
            strategy = %decision.strategy,
            expected = %duration,
            "Selected concatenation strategy"
        );
        if let Some(mismatch) = decision.mismatch {
            debug!(
                "Video stream {} of item {} differs from the first video stream",
                mismatch.stream, mismatch.item
            );
        }

        let progress_sink = self.scratch.create(ScratchKind::ProgressSink)?.into_temp_path();

        let plan = match decision.strategy {
            ConcatStrategy::Demuxer => DemuxerCommandBuilder::new(self.scratch.as_ref()).build(
                &request.output,
                progress_sink,
                &request.items,
                duration,
            )?,
            ConcatStrategy::Filter => FilterCommandBuilder::new().build(
                &request.output,
                progress_sink,
                &request.items,
                duration,
            )?,
        };

        debug!(args = ?plan.args, "Built ffmpeg arguments");
        Ok(plan)
    }
}
