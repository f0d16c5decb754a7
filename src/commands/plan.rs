//! Implementation of the `taskbuild plan` command.

use std::io::Write;
use taskbuild::config::TaskConfig;
use taskbuild::env::Env;
use taskbuild::error::{BuildError, Result};
use taskbuild::jobs::plan_jobs;

/// Print the jobs a build would run, one per line.
pub fn cmd_plan(config: &TaskConfig, env: &Env, out: &mut dyn Write) -> Result<()> {
    let jobs = plan_jobs(config, env)?;

    let written = if jobs.is_empty() {
        writeln!(out, "No jobs planned.")
    } else {
        jobs.iter().try_for_each(|job| writeln!(out, "{}", job))
    };
    written.map_err(|e| BuildError::io("failed to write plan", e))
}
