// Concat interactor - Orchestrates the concatenation use case

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::planner::{ConcatPlan, ConcatPlanner};
use crate::ports::*;

/// Interactor for joining media files
pub struct ConcatInteractor {
    probe_port: Arc<dyn ProbePort>,
    dispatch_port: Arc<dyn DispatchPort>,
    planner: ConcatPlanner,
}

impl ConcatInteractor {
    /// Create new concat interactor with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        scratch_port: Arc<dyn ScratchPort>,
        dispatch_port: Arc<dyn DispatchPort>,
    ) -> Self {
        Self {
            probe_port,
            dispatch_port,
            planner: ConcatPlanner::new(scratch_port),
        }
    }

    /// Probe every path concurrently, keeping the input order.
    ///
    /// A file that cannot be probed comes back as an invalid item carrying
    /// the probe error, so validation can reject the request later.
    pub async fn prepare_items(&self, paths: &[PathBuf]) -> Vec<MediaItem> {
        let tasks: Vec<_> = paths
            .iter()
            .cloned()
            .map(|path| {
                let probe_port = Arc::clone(&self.probe_port);
                tokio::spawn(async move { probe_port.probe_media(&path).await })
            })
            .collect();

        let mut items = Vec::with_capacity(paths.len());
        for (task, path) in tasks.into_iter().zip(paths) {
            let item = match task.await {
                Ok(Ok(item)) => item,
                Ok(Err(e)) => {
                    warn!(path = %path.display(), "Marking item invalid: {}", e);
                    MediaItem::invalid(path, e.to_string())
                }
                Err(e) => {
                    warn!(path = %path.display(), "Probe task failed: {}", e);
                    MediaItem::invalid(path, format!("Probe task failed: {}", e))
                }
            };
            items.push(item);
        }
        items
    }

    /// Build the plan for `request` without starting anything
    pub fn plan<I: Concatenable>(
        &self,
        request: &ConcatRequest<I>,
    ) -> Result<ConcatPlan, DomainError> {
        self.planner.plan(request)
    }

    /// Plan `request` and hand it to the execution facility
    pub async fn start<I: Concatenable>(
        &self,
        request: &ConcatRequest<I>,
    ) -> Result<JobHandle, DomainError> {
        let plan = self.plan(request)?;
        let handle = self.dispatch_port.dispatch(plan).await?;
        info!(job = handle.id, "Dispatched concatenation job");
        Ok(handle)
    }

    /// Probe `paths` and start joining them into `output`
    pub async fn concat_files(
        &self,
        paths: &[PathBuf],
        output: &Path,
    ) -> Result<JobHandle, DomainError> {
        let items = self.prepare_items(paths).await;
        self.start(&ConcatRequest::new(items, output)).await
    }
}
