// Progress interactor - Follows a running job through its progress sink

use std::path::Path;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::TimeSpec;
use crate::engine::progress::{ProgressCallback, ProgressEstimate, ProgressSnapshot};
use crate::ports::{JobHandle, JobOutcome};

/// Interactor reporting progress of dispatched jobs
pub struct ProgressInteractor {
    poll_interval: Duration,
}

impl ProgressInteractor {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Estimate progress from the sink at `path` against the expected duration
    pub fn estimate(path: &Path, expected: TimeSpec) -> Result<ProgressEstimate, DomainError> {
        Ok(match ProgressSnapshot::read(path)? {
            Some(snapshot) => ProgressEstimate::from_snapshot(&snapshot, expected),
            None => ProgressEstimate::not_started(expected),
        })
    }

    /// Report progress of `handle` to `callback` until the job finishes.
    ///
    /// A job that ran but failed is still returned as `Ok`; check
    /// [`JobOutcome::success`].
    pub async fn watch(
        &self,
        handle: JobHandle,
        callback: &dyn ProgressCallback,
    ) -> Result<JobOutcome, DomainError> {
        callback.on_start(&handle);

        let progress_path = handle.progress_path.clone();
        let expected = handle.expected_duration;
        let completion = handle.wait();
        tokio::pin!(completion);

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_reported: Option<ProgressEstimate> = None;

        loop {
            tokio::select! {
                result = &mut completion => {
                    return match result {
                        Ok(outcome) => {
                            if outcome.success() {
                                let done = ProgressSnapshot {
                                    out_time: Some(expected),
                                    finished: true,
                                    ..ProgressSnapshot::default()
                                };
                                let finished = ProgressEstimate::from_snapshot(&done, expected);
                                callback.on_progress(&finished);
                            }
                            callback.on_complete(&outcome);
                            Ok(outcome)
                        }
                        Err(e) => {
                            callback.on_error(&e.to_string());
                            Err(e)
                        }
                    };
                }
                _ = ticker.tick() => {
                    let estimate = match ProgressSnapshot::read(&progress_path) {
                        Ok(Some(snapshot)) => ProgressEstimate::from_snapshot(&snapshot, expected),
                        // sink gone or still empty after earlier reports, keep the last one
                        Ok(None) if last_reported.is_some() => continue,
                        Ok(None) => ProgressEstimate::not_started(expected),
                        Err(e) => {
                            debug!("Skipping progress update: {}", e);
                            continue;
                        }
                    };
                    if last_reported.as_ref() != Some(&estimate) {
                        callback.on_progress(&estimate);
                        last_reported = Some(estimate);
                    }
                }
            }
        }
    }
}
