//! Implementation of the `taskbuild build` command.

use std::io::Write;
use taskbuild::access::AccessLog;
use taskbuild::config::TaskConfig;
use taskbuild::context::TaskContext;
use taskbuild::env::Env;
use taskbuild::error::{BuildError, Result, indent};
use taskbuild::jobs::{JobOutcome, JobRunner, PrebuiltJudgeTools, plan_jobs, run_jobs};
use tracing::debug;

/// Build every planned program, reporting each job and a summary.
///
/// Fails with [`BuildError::JobsFailed`] when any job failed.
pub fn cmd_build(
    ctx: &TaskContext,
    config: &TaskConfig,
    env: &Env,
    out: &mut dyn Write,
) -> Result<()> {
    let jobs = plan_jobs(config, env)?;
    let judge = PrebuiltJudgeTools::from_config(ctx, config);
    let runner = JobRunner::new(ctx, env, &judge);
    let mut log = AccessLog::new();

    let reports = run_jobs(&jobs, &runner, &mut log)?;

    let write_err = |e| BuildError::io("failed to write build report", e);
    for report in &reports {
        match &report.outcome {
            JobOutcome::Succeeded => writeln!(out, "{}: ok", report.name).map_err(write_err)?,
            JobOutcome::Failed(cause) => {
                writeln!(out, "{}: FAILED\n{}", report.name, indent(cause)).map_err(write_err)?
            }
        }
    }

    let failed = reports.iter().filter(|r| !r.succeeded()).count();
    let skipped = jobs.len() - reports.len();
    let mut summary = format!(
        "{} jobs: {} succeeded, {} failed",
        jobs.len(),
        reports.len() - failed,
        failed
    );
    if skipped > 0 {
        summary.push_str(&format!(", {} skipped", skipped));
    }
    writeln!(out, "{}", summary).map_err(write_err)?;

    for path in log.paths() {
        debug!(path = %path.display(), "accessed");
    }

    if failed > 0 {
        return Err(BuildError::JobsFailed {
            failed,
            total: jobs.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use taskbuild::exit_codes;
    use tempfile::TempDir;

    const YAML: &str = r#"
generator:
  build: {program_name: gen, sources: [gen]}
solutions:
  solve:
    run:
      build: {program_name: solve, sources: [solve]}
"#;

    fn setup() -> (TempDir, TaskContext, TaskConfig) {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("gen.sh"), "#!/bin/sh\necho 4\n").unwrap();
        let config = TaskConfig::from_yaml(YAML).unwrap();
        let ctx = TaskContext::new(temp.path(), &config);
        (temp, ctx, config)
    }

    fn build(ctx: &TaskContext, config: &TaskConfig, env: &Env) -> (Result<()>, String) {
        let mut out = Vec::new();
        let result = cmd_build(ctx, config, env, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_build_reports_every_job() {
        let (temp, ctx, config) = setup();
        fs::write(temp.path().join("solve.sh"), "#!/bin/sh\necho 8\n").unwrap();

        let (result, output) = build(&ctx, &config, &Env::default());

        result.unwrap();
        assert_eq!(
            output,
            "Build gen: ok\nBuild solve: ok\n2 jobs: 2 succeeded, 0 failed\n"
        );
        assert!(ctx.target_path("gen").is_file());
        assert!(ctx.target_path("solve").is_file());
    }

    #[test]
    fn test_build_failure_is_reported_and_counted() {
        let (_temp, ctx, config) = setup();

        let (result, output) = build(&ctx, &config, &Env::default());

        let err = result.unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::BUILD_FAILURE);
        assert_eq!(err.to_string(), "1 of 2 jobs failed");
        assert!(output.contains("Build solve: FAILED\n    No paths matching 'solve'.\n"));
        assert!(output.ends_with("2 jobs: 1 succeeded, 1 failed\n"));
    }

    #[test]
    fn test_build_fail_fast_reports_skipped_jobs() {
        let (temp, ctx, _) = setup();
        fs::remove_file(temp.path().join("gen.sh")).unwrap();
        let config = TaskConfig::from_yaml(YAML).unwrap();
        let env = Env {
            fail_fast: true,
            ..Default::default()
        };

        let (result, output) = build(&ctx, &config, &env);

        assert!(result.is_err());
        assert!(output.ends_with("2 jobs: 0 succeeded, 1 failed, 1 skipped\n"));
    }
}
