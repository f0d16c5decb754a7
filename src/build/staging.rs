//! The staging area: a scratch directory owned by one build at a time.

use super::lock::StagingLock;
use super::sources::SourcePath;
use crate::context::TaskContext;
use crate::error::Result;
use crate::fs::{copy_entry, recreate_dir};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exclusive handle on `<build_dir>/.staging`.
///
/// Acquiring takes the staging lock and recreates the directory empty, so
/// nothing from a previous build (failed or not) survives. The lock is
/// released when the handle is dropped; the directory contents stay until
/// the next acquisition.
#[derive(Debug)]
pub struct StagingArea {
    dir: PathBuf,
    _lock: StagingLock,
}

impl StagingArea {
    /// Lock the staging area and reset it to an empty directory.
    pub fn acquire(ctx: &TaskContext, action: &str) -> Result<Self> {
        let lock = StagingLock::acquire(&ctx.staging_lock, action, ctx.lock_stale_minutes)?;
        recreate_dir(&ctx.staging_dir)?;
        debug!(dir = %ctx.staging_dir.display(), "staging area reset");

        Ok(Self {
            dir: ctx.staging_dir.clone(),
            _lock: lock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Copy a source into the staging area under its logical name.
    pub fn stage(&self, source: &SourcePath) -> Result<PathBuf> {
        let dst = self.dir.join(source.name());
        copy_entry(source.path(), &dst)?;
        Ok(dst)
    }
}
