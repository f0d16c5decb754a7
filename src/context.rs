//! Task directory context resolution for taskbuild.
//!
//! This module resolves the canonical layout of a task: the task directory
//! holding `task.yaml` and the program sources, the build-output directory
//! where published programs live, and the hidden staging directory used as
//! scratch space by every build.
//!
//! All commands must use this module to locate paths so that builds always
//! target the same locations regardless of where they are invoked from.

use crate::config::TaskConfig;
use crate::error::{BuildError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the task configuration file inside the task directory.
pub const CONFIG_FILE: &str = "task.yaml";

/// Name of the staging directory inside the build directory.
pub const STAGING_DIR: &str = ".staging";

/// Name of the staging lock file inside the build directory.
pub const STAGING_LOCK: &str = ".staging.lock";

/// Resolved paths for one task. All paths are absolute.
#[derive(Debug, Clone)]
pub struct TaskContext {
    /// Directory containing `task.yaml`; source globs are resolved from here.
    pub task_dir: PathBuf,

    /// Directory where built programs are published.
    pub build_dir: PathBuf,

    /// Scratch directory recreated at the start of every build.
    pub staging_dir: PathBuf,

    /// Lock file guarding the staging directory.
    pub staging_lock: PathBuf,

    /// Minutes after which a leftover staging lock is reclaimed.
    pub lock_stale_minutes: u32,
}

impl TaskContext {
    /// Build the context for `task_dir` using the layout from `config`.
    pub fn new<P: AsRef<Path>>(task_dir: P, config: &TaskConfig) -> Self {
        let task_dir = task_dir.as_ref().to_path_buf();
        let build_dir = task_dir.join(&config.build_dir);
        let staging_dir = build_dir.join(STAGING_DIR);
        let staging_lock = build_dir.join(STAGING_LOCK);

        Self {
            task_dir,
            build_dir,
            staging_dir,
            staging_lock,
            lock_stale_minutes: config.staging_lock_stale_minutes,
        }
    }

    /// Get the published target path of a program.
    pub fn target_path(&self, program_name: &str) -> PathBuf {
        self.build_dir.join(program_name)
    }
}

/// Resolve the task directory: the given one, or the current directory.
pub fn resolve_task_dir(task_dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match task_dir {
        Some(dir) => dir.to_path_buf(),
        None => env::current_dir().map_err(|e| {
            BuildError::Config(format!("failed to get current working directory: {}", e))
        })?,
    };

    let dir = dir.canonicalize().map_err(|e| {
        BuildError::Config(format!(
            "task directory '{}' is not accessible: {}",
            dir.display(),
            e
        ))
    })?;

    if !dir.join(CONFIG_FILE).is_file() {
        return Err(BuildError::Config(format!(
            "no {} found in '{}'.\n\
             Run taskbuild from a task directory or pass --task-dir.",
            CONFIG_FILE,
            dir.display()
        )));
    }

    Ok(dir)
}

/// Resolve the task directory, load its config and build the context.
pub fn load_task(task_dir: Option<&Path>) -> Result<(TaskContext, TaskConfig)> {
    let dir = resolve_task_dir(task_dir)?;
    let config = TaskConfig::load(dir.join(CONFIG_FILE))?;
    let ctx = TaskContext::new(&dir, &config);
    Ok((ctx, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{DirGuard, create_test_task};
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_default_layout() {
        let temp = TempDir::new().unwrap();
        let ctx = TaskContext::new(temp.path(), &TaskConfig::default());

        assert!(ctx.build_dir.ends_with("build"));
        assert!(ctx.staging_dir.ends_with("build/.staging"));
        assert!(ctx.staging_lock.ends_with("build/.staging.lock"));
        assert_eq!(ctx.lock_stale_minutes, 60);
    }

    #[test]
    fn test_custom_build_dir() {
        let temp = TempDir::new().unwrap();
        let config = TaskConfig {
            build_dir: "out/bin".to_string(),
            ..Default::default()
        };
        let ctx = TaskContext::new(temp.path(), &config);

        assert!(ctx.build_dir.ends_with("out/bin"));
        assert!(ctx.target_path("sol").ends_with("out/bin/sol"));
    }

    #[test]
    fn test_resolve_requires_config_file() {
        let temp = TempDir::new().unwrap();
        let err = resolve_task_dir(Some(temp.path())).unwrap_err();

        assert!(matches!(err, BuildError::Config(_)));
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn test_load_task_reads_config() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(CONFIG_FILE), "build_dir: out\n").unwrap();

        let (ctx, config) = load_task(Some(temp.path())).unwrap();

        assert_eq!(config.build_dir, "out");
        assert!(ctx.build_dir.ends_with("out"));
        assert_eq!(ctx.task_dir, temp.path().canonicalize().unwrap());
    }

    #[test]
    #[serial]
    fn test_resolve_defaults_to_current_dir() {
        let temp = create_test_task("");
        let _guard = DirGuard::new(temp.path());

        let dir = resolve_task_dir(None).unwrap();

        assert_eq!(dir, temp.path().canonicalize().unwrap());
    }
}
