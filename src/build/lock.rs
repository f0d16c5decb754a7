//! Cross-process lock on the staging area.
//!
//! Every build empties and refills `<build_dir>/.staging`, so two builds of
//! one task must never overlap. The lock is a file next to the staging
//! directory (`<build_dir>/.staging.lock`), created exclusively, holding a
//! JSON record of who took it and for which build:
//!
//! ```json
//! {
//!   "owner": "alice@laptop",
//!   "pid": 4242,
//!   "since": "2026-10-16T09:30:00Z",
//!   "build": "build solve"
//! }
//! ```
//!
//! A lock held longer than the configured number of minutes is assumed to be
//! left over from a crashed build and is taken over once.

use crate::error::{BuildError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Exclusive hold on the staging area, released on drop.
#[derive(Debug)]
pub struct StagingLock {
    path: PathBuf,
}

/// The record written into a lock file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Holder {
    owner: String,
    pid: u32,
    since: DateTime<Utc>,
    build: String,
}

impl StagingLock {
    /// Take the lock at `path` on behalf of `build` (e.g. `build solve`).
    ///
    /// Fails with [`BuildError::StagingLocked`] when a live holder has it.
    pub fn acquire(path: &Path, build: &str, stale_minutes: u32) -> Result<Self> {
        let record = serde_json::to_string_pretty(&Holder::current(build)).map_err(|e| {
            BuildError::io("failed to encode staging lock", std::io::Error::other(e))
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                BuildError::io(format!("failed to create '{}'", parent.display()), e)
            })?;
        }

        let mut took_over = false;
        loop {
            if create_exclusive(path, &record)? {
                debug!(lock = %path.display(), build, "staging lock taken");
                return Ok(Self {
                    path: path.to_path_buf(),
                });
            }

            match Holder::read(path) {
                Some(holder) if !took_over && holder.is_abandoned(stale_minutes) => {
                    warn!(
                        lock = %path.display(),
                        owner = %holder.owner,
                        build = %holder.build,
                        held_for = %format_duration(holder.held_for()),
                        "taking over abandoned staging lock"
                    );
                    remove_lock_file(path).map_err(|e| {
                        BuildError::io(format!("failed to remove '{}'", path.display()), e)
                    })?;
                    took_over = true;
                }
                holder => return Err(locked(path, holder.as_ref())),
            }
        }
    }
}

impl Drop for StagingLock {
    fn drop(&mut self) {
        if let Err(e) = remove_lock_file(&self.path) {
            warn!(lock = %self.path.display(), error = %e, "failed to release staging lock");
        }
    }
}

impl Holder {
    fn current(build: &str) -> Self {
        Self {
            owner: owner(),
            pid: std::process::id(),
            since: Utc::now(),
            build: build.to_string(),
        }
    }

    /// The record in an existing lock file; `None` when it cannot be read.
    fn read(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn held_for(&self) -> Duration {
        Utc::now().signed_duration_since(self.since)
    }

    fn is_abandoned(&self, stale_minutes: u32) -> bool {
        self.held_for().num_minutes() > i64::from(stale_minutes)
    }
}

/// Create `path` with `record` as its content; `false` if it already exists.
fn create_exclusive(path: &Path, record: &str) -> Result<bool> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => {
            return Err(BuildError::io(
                format!("failed to create '{}'", path.display()),
                e,
            ));
        }
    };
    if let Err(e) = file.write_all(record.as_bytes()) {
        let _ = fs::remove_file(path);
        return Err(BuildError::io(
            format!("failed to write '{}'", path.display()),
            e,
        ));
    }
    Ok(true)
}

/// Remove a lock file, treating an already missing one as removed.
fn remove_lock_file(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

fn locked(path: &Path, holder: Option<&Holder>) -> BuildError {
    match holder {
        Some(holder) => BuildError::StagingLocked(format!(
            "'{}' is held by {} (pid {}) for '{}' since {} ago",
            path.display(),
            holder.owner,
            holder.pid,
            holder.build,
            format_duration(holder.held_for())
        )),
        None => BuildError::StagingLocked(format!("'{}' is held by another build", path.display())),
    }
}

/// `user@host` of the current process.
fn owner() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());
    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    format!("{}@{}", user, host)
}

/// Render a duration at minute precision: `12m`, `1h 30m`, `2d 3h`.
fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    let (days, hours) = (minutes / (24 * 60), minutes / 60 % 24);
    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else {
        format!("{}m", minutes)
    }
}
