//! Accessed-file tracking.
//!
//! Builds report every source they stage and every target they publish so
//! that a staleness tracker can decide later whether a rebuild is needed.
//! The tracker itself is external; this module only defines the channel.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Receives the paths a job read or wrote.
pub trait AccessTracker {
    fn access(&mut self, path: &Path);
}

/// In-memory tracker collecting a sorted, deduplicated set of paths.
#[derive(Debug, Clone, Default)]
pub struct AccessLog {
    paths: BTreeSet<PathBuf>,
}

impl AccessLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}

impl AccessTracker for AccessLog {
    fn access(&mut self, path: &Path) {
        self.paths.insert(path.to_path_buf());
    }
}
