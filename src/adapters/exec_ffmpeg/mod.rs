//! FFmpeg execution adapter
//!
//! Runs a concatenation plan with the ffmpeg binary on a background tokio
//! task. Dispatch returns as soon as the process has been spawned.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::planner::ConcatPlan;
use crate::ports::*;

/// Number of stderr lines kept for the job outcome
const STDERR_TAIL_LINES: usize = 20;

/// FFmpeg-based execution adapter
pub struct FfmpegDispatchAdapter {
    binary: PathBuf,
    next_id: AtomicU64,
}

impl FfmpegDispatchAdapter {
    /// Create new FFmpeg adapter running `binary`
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl DispatchPort for FfmpegDispatchAdapter {
    async fn dispatch(&self, plan: ConcatPlan) -> Result<JobHandle, DomainError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(job = id, binary = %self.binary.display(), args = ?plan.args, "Spawning ffmpeg");

        let child = Command::new(&self.binary)
            .args(&plan.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                DomainError::DispatchFail(format!(
                    "Failed to start {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        let (handle, completion) = JobHandle::for_plan(id, &plan);
        info!(
            job = id,
            strategy = %plan.strategy,
            output = %plan.output.display(),
            "Concatenation job accepted"
        );

        tokio::spawn(async move {
            let result = run_to_completion(id, child, &plan).await;
            // report first, the progress file must still exist for the final poll
            completion.complete(result);
            drop(plan);
        });

        Ok(handle)
    }
}

/// Wait for ffmpeg to exit while collecting the tail of its stderr.
///
/// The caller keeps the plan, and with it the scratch files, until the
/// outcome has been reported.
async fn run_to_completion(
    id: JobId,
    mut child: Child,
    plan: &ConcatPlan,
) -> Result<JobOutcome, DomainError> {
    let started = Instant::now();
    let stderr = child.stderr.take();

    let collect_tail = async move {
        let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
        if let Some(stderr) = stderr {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
        }
        tail
    };

    let (status, tail) = tokio::join!(child.wait(), collect_tail);
    let status = status.map_err(|e| {
        DomainError::DispatchFail(format!("Lost track of ffmpeg job {}: {}", id, e))
    })?;

    let outcome = JobOutcome {
        job_id: id,
        output: plan.output.clone(),
        exit_code: status.code(),
        elapsed: started.elapsed(),
        stderr_tail: tail.into_iter().collect(),
    };

    if outcome.success() {
        info!(job = id, elapsed = ?outcome.elapsed, "Concatenation job finished");
    } else {
        warn!(job = id, exit_code = ?outcome.exit_code, "Concatenation job failed");
    }

    Ok(outcome)
}
