//! Deciding which jobs a run needs.

use super::{Job, JudgeTool};
use crate::config::{OutCheck, RunConfig, TaskConfig};
use crate::env::Env;
use crate::error::{BuildError, Result};

/// Plan the jobs needed for the run described by `env`.
///
/// The generator and validator are always built when declared. The output
/// judge and solutions are only needed when solutions are being tested.
/// Programs without a run section are skipped; asking for a solution the
/// task does not declare is a configuration error.
pub fn plan_jobs(config: &TaskConfig, env: &Env) -> Result<Vec<Job>> {
    let mut jobs = Vec::new();

    jobs.extend(build_job(config.generator.as_ref()));
    jobs.extend(build_job(config.validator.as_ref()));

    if env.target.includes_solutions() {
        match config.out_check {
            OutCheck::Diff => {}
            OutCheck::Judge => jobs.extend(build_job(config.out_judge.as_ref())),
            OutCheck::Tokens => jobs.push(Job::PrepareJudge(JudgeTool::Token)),
            OutCheck::Shuffle => jobs.push(Job::PrepareJudge(JudgeTool::Shuffle)),
        }

        for name in selected_solutions(config, env)? {
            let run = config.solutions.get(name).and_then(|s| s.run.as_ref());
            jobs.extend(build_job(run));
        }
    }

    Ok(jobs)
}

fn build_job(run: Option<&RunConfig>) -> Option<Job> {
    run.map(|run| Job::Build(run.build.clone()))
}

fn selected_solutions<'a>(config: &'a TaskConfig, env: &'a Env) -> Result<Vec<&'a str>> {
    let Some(selected) = &env.solutions else {
        return Ok(config.solutions.keys().map(String::as_str).collect());
    };

    for name in selected {
        if !config.solutions.contains_key(name) {
            let declared: Vec<&str> = config.solutions.keys().map(String::as_str).collect();
            return Err(BuildError::Config(format!(
                "unknown solution '{}' (declared: {})",
                name,
                if declared.is_empty() {
                    "none".to_string()
                } else {
                    declared.join(", ")
                }
            )));
        }
    }
    Ok(selected.iter().map(String::as_str).collect())
}
