//! Media file discovery

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::domain::errors::DomainError;

/// File extensions picked up when expanding a directory
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mov", "mkv", "webm", "avi", "wmv", "flv", "mpg", "mpeg", "ts", "mts", "3gp",
    "mp3", "m4a", "aac", "wav", "flac", "ogg", "opus",
];

/// Whether `path` has a known media extension (case-insensitive)
pub fn is_media_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MEDIA_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Media files directly inside `dir`, sorted by file name
pub fn list_media_files(dir: &Path) -> Result<Vec<PathBuf>, DomainError> {
    if !dir.is_dir() {
        return Err(DomainError::BadArgs(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            DomainError::FsFail(format!("Failed to list {}: {}", dir.display(), e))
        })?;
        if entry.file_type().is_file() && is_media_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
