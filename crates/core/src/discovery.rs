use crate::formatter::file_extension;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".tif", ".tiff", ".png", ".arw", ".cr2", ".nef", ".orf", ".rw2", ".dng",
    ".heic", ".heif",
];

/// Regular files with a supported extension, sorted by file name within each
/// directory. Symlinks to regular files count; directory links are not
/// followed. A walk failure is reported as no candidates.
pub fn collect_files(root: &Path, recursive: bool) -> Vec<PathBuf> {
    match walk(root, recursive) {
        Ok(files) => files,
        Err(err) => {
            log::warn!("{err:#}");
            Vec::new()
        }
    }
}

fn walk(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut out = Vec::new();

    for entry in WalkDir::new(root).max_depth(max_depth).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk folder: {}", root.display()))?;
        if !entry.path().is_file() {
            continue;
        }
        if is_supported_image(entry.path()) {
            out.push(entry.into_path());
        }
    }

    Ok(out)
}

pub fn is_supported_image(path: &Path) -> bool {
    let ext = file_extension(path).to_lowercase();
    SUPPORTED_EXTENSIONS.contains(&ext.as_str())
}
