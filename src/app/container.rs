use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{AppConfig, FfmpegDispatchAdapter, FfprobeAdapter, TempScratchAdapter};
use crate::app::{concat_interactor::ConcatInteractor, progress_interactor::ProgressInteractor};
use crate::ports::{DispatchPort, ProbePort, ScratchPort};

pub trait AppContainer: Send + Sync {
    fn concat_interactor(&self) -> Arc<ConcatInteractor>;
    fn progress_interactor(&self) -> Arc<ProgressInteractor>;
}

pub struct DefaultAppContainer {
    concat_interactor: Arc<ConcatInteractor>,
    progress_interactor: Arc<ProgressInteractor>,
}

impl DefaultAppContainer {
    pub fn new(config: &AppConfig) -> Self {
        let probe_port = Arc::new(FfprobeAdapter::new(&config.tools.ffprobe));
        let scratch_port = Arc::new(TempScratchAdapter::new(config.scratch.dir.clone()));
        let dispatch_port = Arc::new(FfmpegDispatchAdapter::new(&config.tools.ffmpeg));

        Self::with_ports(
            probe_port as Arc<dyn ProbePort>,
            scratch_port as Arc<dyn ScratchPort>,
            dispatch_port as Arc<dyn DispatchPort>,
            Duration::from_millis(config.progress.poll_interval_ms),
        )
    }

    /// Wire the interactors around caller-supplied ports
    pub fn with_ports(
        probe_port: Arc<dyn ProbePort>,
        scratch_port: Arc<dyn ScratchPort>,
        dispatch_port: Arc<dyn DispatchPort>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            concat_interactor: Arc::new(ConcatInteractor::new(
                probe_port,
                scratch_port,
                dispatch_port,
            )),
            progress_interactor: Arc::new(ProgressInteractor::new(poll_interval)),
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn concat_interactor(&self) -> Arc<ConcatInteractor> {
        Arc::clone(&self.concat_interactor)
    }

    fn progress_interactor(&self) -> Arc<ProgressInteractor> {
        Arc::clone(&self.progress_interactor)
    }
}
