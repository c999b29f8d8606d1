//! Shared helpers for integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use concatx_cli::adapters::TempScratchAdapter;
use concatx_cli::{MediaItem, TimeSpec, Timebase, VideoStreamDescriptor};
use tempfile::TempDir;

/// 1080p H.264 stream at 25 fps
pub fn hd_stream() -> VideoStreamDescriptor {
    VideoStreamDescriptor::new(
        1920,
        1080,
        "avc1",
        Timebase::new(1, 12800).unwrap(),
        Timebase::new(1, 50).unwrap(),
        Timebase::new(25, 1).unwrap(),
    )
}

pub fn valid_item(
    path: impl Into<PathBuf>,
    seconds: f64,
    streams: Vec<VideoStreamDescriptor>,
) -> MediaItem {
    MediaItem::valid(path, TimeSpec::from_seconds(seconds), streams)
}

/// Scratch adapter writing into its own temporary directory
pub fn scratch() -> (TempDir, Arc<TempScratchAdapter>) {
    let dir = TempDir::new().unwrap();
    let adapter = Arc::new(TempScratchAdapter::new(Some(dir.path().to_path_buf())));
    (dir, adapter)
}

pub fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
