//! Sequential job execution.

use super::Job;
use super::judge::JudgePreparer;
use crate::access::AccessTracker;
use crate::build::ProgramBuilder;
use crate::context::TaskContext;
use crate::env::Env;
use crate::error::{BuildError, Result};
use tracing::debug;

/// How a job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded,
    /// The job failed for a reason the user can fix; carries the cause.
    Failed(String),
}

/// Outcome of one job of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub name: String,
    pub outcome: JobOutcome,
}

impl JobReport {
    pub fn succeeded(&self) -> bool {
        self.outcome == JobOutcome::Succeeded
    }

    /// `"<job> failed: <cause>"` for failed jobs.
    pub fn failure_message(&self) -> Option<String> {
        match &self.outcome {
            JobOutcome::Succeeded => None,
            JobOutcome::Failed(cause) => Some(format!("{} failed: {}", self.name, cause)),
        }
    }
}

/// Executes jobs of one task.
pub struct JobRunner<'a> {
    ctx: &'a TaskContext,
    env: &'a Env,
    judge: &'a dyn JudgePreparer,
}

impl<'a> JobRunner<'a> {
    pub fn new(ctx: &'a TaskContext, env: &'a Env, judge: &'a dyn JudgePreparer) -> Self {
        Self { ctx, env, judge }
    }

    /// Run a single job to completion.
    pub fn run_job(&self, job: &Job, tracker: &mut dyn AccessTracker) -> Result<()> {
        match job {
            Job::Build(section) => {
                ProgramBuilder::new(self.ctx, self.env).build(section, tracker)?;
            }
            Job::PrepareJudge(tool) => {
                self.judge.prepare(*tool, self.ctx, tracker)?;
            }
        }
        Ok(())
    }
}

/// Run `jobs` in order, one at a time.
///
/// A job failing for a reason the user can fix is recorded and the run goes
/// on, unless `fail_fast` is set. Faults and a held staging lock abort the
/// run: every remaining job would hit them too.
pub fn run_jobs(
    jobs: &[Job],
    runner: &JobRunner<'_>,
    tracker: &mut dyn AccessTracker,
) -> Result<Vec<JobReport>> {
    let mut reports = Vec::with_capacity(jobs.len());

    for job in jobs {
        debug!(job = %job, "running job");
        let outcome = match runner.run_job(job, tracker) {
            Ok(()) => JobOutcome::Succeeded,
            Err(e) if aborts_run(&e) => return Err(e),
            Err(e) => {
                debug!(job = %job, error = %e, "job failed");
                JobOutcome::Failed(e.to_string())
            }
        };

        let failed = outcome != JobOutcome::Succeeded;
        reports.push(JobReport {
            name: job.name(),
            outcome,
        });
        if failed && runner.env.fail_fast {
            debug!("stopping after first failure");
            break;
        }
    }

    Ok(reports)
}

fn aborts_run(err: &BuildError) -> bool {
    err.is_fault() || matches!(err, BuildError::StagingLocked(_))
}
