//! Concat demuxer command (stream copy)

use std::io::Write;
use std::path::Path;

use tempfile::TempPath;
use tracing::debug;

use crate::domain::errors::DomainError;
use crate::domain::model::{ConcatStrategy, Concatenable, TimeSpec};
use crate::domain::rules::is_single_line;
use crate::engine::{path_to_arg, ArgumentBuilder};
use crate::planner::ConcatPlan;
use crate::ports::{ScratchKind, ScratchPort};

/// Builds the fast-path command: all inputs listed in a manifest, streams copied as-is.
///
/// Only valid when every video stream was found compatible. ffmpeg reports
/// its own error if the streams turn out not to be.
pub struct DemuxerCommandBuilder<'a> {
    scratch: &'a dyn ScratchPort,
}

impl<'a> DemuxerCommandBuilder<'a> {
    pub fn new(scratch: &'a dyn ScratchPort) -> Self {
        Self { scratch }
    }

    /// Write the manifest and assemble the plan
    pub fn build<I: Concatenable>(
        &self,
        output: &Path,
        progress_sink: TempPath,
        items: &[I],
        duration: TimeSpec,
    ) -> Result<ConcatPlan, DomainError> {
        let contents = Self::manifest_contents(items)?;

        let mut file = self.scratch.create(ScratchKind::Manifest)?;
        file.write_all(contents.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| {
                DomainError::FsFail(format!(
                    "Failed to write concat manifest {}: {}",
                    file.path().display(),
                    e
                ))
            })?;
        let manifest = file.into_temp_path();
        debug!(manifest = %manifest.display(), entries = items.len(), "Concat manifest written");

        // ffmpeg -y -progress <sink> -f concat -auto_convert 1 -i <manifest> -codec copy <output>
        let args = ArgumentBuilder::new()
            .flags("-y") // Overwrite output file if it exists
            .flags("-progress")
            .arg(path_to_arg(&progress_sink)?)
            .flags("-f concat")
            .flags("-auto_convert 1") // Convert packets so streams can be concatenated
            .flags("-i")
            .arg(path_to_arg(&manifest)?)
            .flags("-codec copy")
            .arg(path_to_arg(output)?)
            .build();

        Ok(ConcatPlan::new(
            ConcatStrategy::Demuxer,
            args,
            output.to_path_buf(),
            duration,
            items.len(),
            progress_sink,
            Some(manifest),
        ))
    }

    /// Manifest text: one `file '<path>'` line per item, in request order.
    ///
    /// Paths are made absolute because the demuxer resolves relative entries
    /// against the manifest's own directory.
    pub fn manifest_contents<I: Concatenable>(items: &[I]) -> Result<String, DomainError> {
        let mut contents = String::new();
        for item in items {
            if !is_single_line(item.path()) {
                return Err(DomainError::BadArgs(format!(
                    "Path contains a line break: {:?}",
                    item.path()
                )));
            }
            let absolute = std::path::absolute(item.path()).map_err(|e| {
                DomainError::FsFail(format!(
                    "Failed to resolve {}: {}",
                    item.path().display(),
                    e
                ))
            })?;
            let path = path_to_arg(&absolute)?;
            contents.push_str(&format!("file '{}'\n", escape_quotes(&path)));
        }
        Ok(contents)
    }
}

/// Quote escaping understood by the concat demuxer: `'` becomes `'\''`
fn escape_quotes(path: &str) -> String {
    path.replace('\'', r"'\''")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::MediaItem;

    fn items(paths: &[&str]) -> Vec<MediaItem> {
        paths
            .iter()
            .map(|p| MediaItem::valid(*p, TimeSpec::from_seconds(1.0), vec![]))
            .collect()
    }

    #[test]
    fn test_manifest_has_one_line_per_item_in_order() {
        let contents =
            DemuxerCommandBuilder::manifest_contents(&items(&["/v/a.mp4", "/v/b.mp4", "/v/c.mp4"]))
                .unwrap();
        assert_eq!(
            contents,
            "file '/v/a.mp4'\nfile '/v/b.mp4'\nfile '/v/c.mp4'\n"
        );
    }

    #[test]
    fn test_manifest_resolves_relative_paths() {
        let contents = DemuxerCommandBuilder::manifest_contents(&items(&["a.mp4"])).unwrap();
        let cwd = std::env::current_dir().unwrap();
        let expected = format!("file '{}'\n", cwd.join("a.mp4").display());
        assert_eq!(contents, expected);
    }

    #[test]
    fn test_manifest_escapes_single_quotes() {
        let contents = DemuxerCommandBuilder::manifest_contents(&items(&["/v/it's.mp4"])).unwrap();
        assert_eq!(contents, "file '/v/it'\\''s.mp4'\n");
    }

    #[test]
    fn test_manifest_refuses_multi_line_paths() {
        let err = DemuxerCommandBuilder::manifest_contents(&items(&["/v/a\nb.mp4", "/v/c.mp4"]))
            .unwrap_err();
        assert!(matches!(err, DomainError::BadArgs(_)));
    }
}
