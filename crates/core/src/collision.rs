use crate::result::RenameError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Target paths already handed out during one run. Shared by all workers of
/// the run so two files can never be given the same target.
#[derive(Debug, Default)]
pub struct ClaimTable {
    claimed: Mutex<HashSet<PathBuf>>,
}

impl ClaimTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the path was already claimed.
    pub fn claim(&self, path: &Path) -> bool {
        self.lock().insert(path.to_path_buf())
    }

    pub fn is_claimed(&self, path: &Path) -> bool {
        self.lock().contains(path)
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<PathBuf>> {
        self.claimed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `base+ext` next to `original`, or `base_1+ext`, `base_2+ext`, ... until a
/// path is found that is either the original itself or free on disk, and not
/// yet claimed in this run.
pub fn find_unique_target_path(
    original: &Path,
    base: &str,
    extension: &str,
    claims: &ClaimTable,
) -> Result<PathBuf, RenameError> {
    let parent = original
        .parent()
        .ok_or_else(|| RenameError::NoParent(original.to_path_buf()))?;

    let mut candidate = parent.join(format!("{base}{extension}"));
    let mut n = 0usize;
    loop {
        if is_available(&candidate, original) && claims.claim(&candidate) {
            return Ok(candidate);
        }
        n += 1;
        candidate = parent.join(format!("{base}_{n}{extension}"));
    }
}

fn is_available(candidate: &Path, original: &Path) -> bool {
    candidate == original || candidate.symlink_metadata().is_err()
}
