use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const NO_EXIF_DATE: &str = "No EXIF date";

/// Outcome for one processed file. Skipped and Error leave the file untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenameResult {
    Success { original: PathBuf, new_name: String },
    Skipped { original: PathBuf, reason: String },
    Error { original: PathBuf, reason: String },
}

impl RenameResult {
    pub fn success(original: &Path, target: &Path) -> Self {
        Self::Success {
            original: original.to_path_buf(),
            new_name: file_name(target),
        }
    }

    pub fn skipped(original: &Path, reason: impl Into<String>) -> Self {
        Self::Skipped {
            original: original.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn error(original: &Path, err: &RenameError) -> Self {
        Self::Error {
            original: original.to_path_buf(),
            reason: err.reason(),
        }
    }

    pub fn original(&self) -> &Path {
        match self {
            Self::Success { original, .. }
            | Self::Skipped { original, .. }
            | Self::Error { original, .. } => original,
        }
    }

    pub fn log_line(&self) -> String {
        let original = file_name(self.original());
        match self {
            Self::Success { new_name, .. } => format!("RENAMED {original} → {new_name}"),
            Self::Skipped { reason, .. } => format!("SKIP    {original} ({reason})"),
            Self::Error { reason, .. } => format!("ERROR   {original} ({reason})"),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameSummary {
    pub renamed: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl RenameSummary {
    pub fn record(&mut self, result: &RenameResult) {
        match result {
            RenameResult::Success { .. } => self.renamed += 1,
            RenameResult::Skipped { .. } => self.skipped += 1,
            RenameResult::Error { .. } => self.errors += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.renamed + self.skipped + self.errors
    }
}

/// Per-file failure. Never aborts the batch; it is reported as
/// [`RenameResult::Error`] with [`RenameError::reason`].
#[derive(Debug, Error)]
pub enum RenameError {
    #[error("cannot move {} to {}: {source}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} has no parent directory", .0.display())]
    NoParent(PathBuf),
    #[error("{0}")]
    Panicked(String),
    #[error("worker pool shut down before the file was processed")]
    Cancelled,
}

impl RenameError {
    pub fn category(&self) -> &'static str {
        match self {
            Self::Move { .. } => "IoError",
            Self::NoParent(_) => "InvalidPath",
            Self::Panicked(_) => "Panic",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn reason(&self) -> String {
        format!("{}: {}", self.category(), self)
    }
}

/// Receives progress for one run. `on_progress` is called in completion order,
/// always from the thread that started the run.
pub trait ProgressListener {
    fn on_start(&mut self, total: usize);
    fn on_progress(&mut self, result: RenameResult);
    fn on_complete(&mut self, renamed: usize, skipped: usize, errors: usize);
}
