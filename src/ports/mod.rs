// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tempfile::NamedTempFile;
use tokio::sync::oneshot;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::planner::ConcatPlan;

/// Port for media file probing
///
/// Fills in the metadata the planner reads from each item. A file that
/// cannot be probed is reported as an error; callers decide whether that
/// makes the item invalid.
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Probe a media file and return it as a valid item
    async fn probe_media(&self, file_path: &Path) -> Result<MediaItem, DomainError>;
}

/// Kind of scratch file a plan needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScratchKind {
    /// Target of ffmpeg's `-progress` option
    ProgressSink,
    /// Input list for the concat demuxer
    Manifest,
}

/// Port for per-plan temporary files
///
/// Every call must return a fresh, unique path. The returned file is
/// removed when its handle (or the `TempPath` derived from it) is dropped.
pub trait ScratchPort: Send + Sync {
    fn create(&self, kind: ScratchKind) -> Result<NamedTempFile, DomainError>;
}

/// Port for handing a built plan to the execution facility
#[async_trait]
pub trait DispatchPort: Send + Sync {
    /// Accept the plan for background execution and return immediately.
    ///
    /// An error means the job was rejected and nothing is running.
    async fn dispatch(&self, plan: ConcatPlan) -> Result<JobHandle, DomainError>;
}

/// Identifier of a dispatched job
pub type JobId = u64;

/// Final report of a dispatched job
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub job_id: JobId,
    pub output: PathBuf,
    /// Process exit code, `None` when killed by a signal
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
    /// Last lines ffmpeg wrote to stderr
    pub stderr_tail: Vec<String>,
}

impl JobOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Reference to a job that was accepted by a [`DispatchPort`]
#[derive(Debug)]
pub struct JobHandle {
    pub id: JobId,
    pub strategy: ConcatStrategy,
    pub output: PathBuf,
    pub progress_path: PathBuf,
    pub expected_duration: TimeSpec,
    pub accepted_at: DateTime<Utc>,
    completion: oneshot::Receiver<Result<JobOutcome, DomainError>>,
}

/// Sending half paired with a [`JobHandle`], owned by whoever runs the job
#[derive(Debug)]
pub struct JobCompletion {
    sender: oneshot::Sender<Result<JobOutcome, DomainError>>,
}

impl JobHandle {
    /// Create a handle describing `plan` and the completion used to resolve it
    pub fn for_plan(id: JobId, plan: &ConcatPlan) -> (Self, JobCompletion) {
        let (sender, completion) = oneshot::channel();
        let handle = Self {
            id,
            strategy: plan.strategy,
            output: plan.output.clone(),
            progress_path: plan.progress_path().to_path_buf(),
            expected_duration: plan.expected_duration,
            accepted_at: Utc::now(),
            completion,
        };
        (handle, JobCompletion { sender })
    }

    /// Wait for the job to finish
    pub async fn wait(self) -> Result<JobOutcome, DomainError> {
        match self.completion.await {
            Ok(result) => result,
            Err(_) => Err(DomainError::DispatchFail(format!(
                "Job {} ended without reporting an outcome",
                self.id
            ))),
        }
    }
}

impl JobCompletion {
    /// Resolve the paired handle; a handle that was already dropped is ignored
    pub fn complete(self, result: Result<JobOutcome, DomainError>) {
        let _ = self.sender.send(result);
    }
}
