// Temp-file scratch adapter - Per-plan progress sinks and manifests

use std::path::PathBuf;

use tempfile::{Builder, NamedTempFile};
use tracing::debug;

use crate::domain::errors::*;
use crate::ports::*;

/// Scratch adapter backed by `tempfile`
///
/// Files go to `dir` when set, otherwise to the system temp directory.
#[derive(Debug, Clone, Default)]
pub struct TempScratchAdapter {
    dir: Option<PathBuf>,
}

impl TempScratchAdapter {
    /// Create new scratch adapter
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// Directory scratch files are created in
    pub fn dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    fn name_parts(kind: ScratchKind) -> (&'static str, &'static str) {
        match kind {
            ScratchKind::ProgressSink => ("concatx-pg-", ".progress"),
            ScratchKind::Manifest => ("concatx-ls-", ".ffconcat"),
        }
    }
}

impl ScratchPort for TempScratchAdapter {
    fn create(&self, kind: ScratchKind) -> Result<NamedTempFile, DomainError> {
        let (prefix, suffix) = Self::name_parts(kind);
        let dir = self.dir();
        let file = Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(&dir)
            .map_err(|e| {
                DomainError::FsFail(format!(
                    "Failed to create {:?} scratch file in {}: {}",
                    kind,
                    dir.display(),
                    e
                ))
            })?;
        debug!(path = %file.path().display(), ?kind, "Scratch file created");
        Ok(file)
    }
}
