//! Build jobs: planning which programs a run needs and running them.
//!
//! The planner turns a task configuration into a flat list of [`Job`]s. The
//! runner executes that list strictly in sequence, since every build shares
//! the same staging area.

mod judge;
mod planner;
mod runner;

#[cfg(test)]
mod tests;

use crate::config::BuildSection;
use std::fmt;

pub use judge::{JudgePreparer, PrebuiltJudgeTools};
pub use planner::plan_jobs;
pub use runner::{JobOutcome, JobReport, JobRunner, run_jobs};

/// A pre-built judge helper, prepared instead of compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JudgeTool {
    /// Compares outputs token by token.
    Token,
    /// Compares outputs ignoring the order of lines and tokens.
    Shuffle,
}

impl JudgeTool {
    pub fn name(self) -> &'static str {
        match self {
            JudgeTool::Token => "token",
            JudgeTool::Shuffle => "shuffle",
        }
    }

    /// File name of the helper executable.
    pub fn executable(self) -> &'static str {
        match self {
            JudgeTool::Token => "judge-token",
            JudgeTool::Shuffle => "judge-shuffle",
        }
    }
}

/// One unit of work of a build run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Build a program from its sources.
    Build(BuildSection),
    /// Make a pre-built judge helper available in the build directory.
    PrepareJudge(JudgeTool),
}

impl Job {
    /// Human-readable job name used in reports.
    pub fn name(&self) -> String {
        match self {
            Job::Build(section) => format!("Build {}", section.program_name),
            Job::PrepareJudge(tool) => format!("Prepare {} judge", tool.name()),
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
