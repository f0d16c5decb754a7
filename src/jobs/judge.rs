//! Preparing pre-built judge helpers.

use super::JudgeTool;
use crate::access::AccessTracker;
use crate::config::TaskConfig;
use crate::context::TaskContext;
use crate::error::{BuildError, Result};
use crate::fs::{copy_entry, remove_entry};
use std::path::PathBuf;
use tracing::info;

/// Makes a judge helper available in the build directory.
pub trait JudgePreparer {
    /// Prepare `tool`, returning the path of the ready-to-run helper.
    fn prepare(
        &self,
        tool: JudgeTool,
        ctx: &TaskContext,
        tracker: &mut dyn AccessTracker,
    ) -> Result<PathBuf>;
}

/// Copies `judge-token` / `judge-shuffle` from a directory of pre-built helpers.
#[derive(Debug, Clone, Default)]
pub struct PrebuiltJudgeTools {
    dir: Option<PathBuf>,
}

impl PrebuiltJudgeTools {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// Use the task's `judge_tools_dir`, relative to the task directory.
    pub fn from_config(ctx: &TaskContext, config: &TaskConfig) -> Self {
        Self::new(config.judge_tools_dir.as_ref().map(|d| ctx.task_dir.join(d)))
    }
}

impl JudgePreparer for PrebuiltJudgeTools {
    fn prepare(
        &self,
        tool: JudgeTool,
        ctx: &TaskContext,
        tracker: &mut dyn AccessTracker,
    ) -> Result<PathBuf> {
        let Some(dir) = &self.dir else {
            return Err(BuildError::JudgePreparation(format!(
                "judge_tools_dir is not set, cannot provide {}",
                tool.executable()
            )));
        };

        let source = dir.join(tool.executable());
        if !source.is_file() {
            return Err(BuildError::JudgePreparation(format!(
                "{} not found in '{}'",
                tool.executable(),
                dir.display()
            )));
        }

        let target = ctx.build_dir.join(tool.executable());
        remove_entry(&target)?;
        copy_entry(&source, &target)?;
        tracker.access(&source);
        tracker.access(&target);

        info!("Prepared {} judge at '{}'.", tool.name(), target.display());
        Ok(target)
    }
}
