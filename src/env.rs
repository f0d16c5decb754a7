//! Run-time environment of a taskbuild invocation.
//!
//! Unlike [`crate::config::TaskConfig`], which describes the task, the
//! environment describes what this particular run should do: which programs
//! to build, how to render diagnostics, and whether to stop at the first failure.

use clap::ValueEnum;

/// What part of the task is being tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TestingTarget {
    /// Generator, validator, judge and solutions.
    #[default]
    All,
    /// Only the generator and validator.
    Generator,
    /// Everything needed to run solutions.
    Solution,
}

impl TestingTarget {
    /// Whether the judge and solutions are needed for this target.
    pub fn includes_solutions(self) -> bool {
        matches!(self, TestingTarget::All | TestingTarget::Solution)
    }
}

/// Settings of one taskbuild run.
#[derive(Debug, Clone, Default)]
pub struct Env {
    /// What is being tested.
    pub target: TestingTarget,

    /// Solutions to build; `None` builds every declared solution.
    pub solutions: Option<Vec<String>>,

    /// Disable colored toolchain diagnostics.
    pub plain: bool,

    /// Stop after the first failed job.
    pub fail_fast: bool,
}
