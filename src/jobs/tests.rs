//! Tests for job planning and running.

use super::*;
use crate::access::{AccessLog, AccessTracker};
use crate::config::{OutCheck, TaskConfig};
use crate::context::TaskContext;
use crate::env::{Env, TestingTarget};
use crate::error::{BuildError, Result};
use crate::test_support::{write_file, write_script};
use std::path::PathBuf;
use tempfile::TempDir;

const TASK_YAML: &str = r#"
generator:
  build:
    program_name: gen
    sources: [gen]
validator:
  build: {program_name: validate, sources: [validate]}
out_check: judge
out_judge:
  build: {program_name: judge, sources: [judge]}
solutions:
  solve:
    primary: true
    run:
      build: {program_name: solve, sources: [solve]}
  slow:
    run:
      build: {program_name: slow, sources: [solutions/slow]}
  draft: {}
"#;

fn names(jobs: &[Job]) -> Vec<String> {
    jobs.iter().map(Job::name).collect()
}

fn env_for(target: TestingTarget) -> Env {
    Env {
        target,
        ..Default::default()
    }
}

// ============================================================================
// Planner
// ============================================================================

#[test]
fn test_plan_everything() {
    let config = TaskConfig::from_yaml(TASK_YAML).unwrap();

    let jobs = plan_jobs(&config, &Env::default()).unwrap();

    assert_eq!(
        names(&jobs),
        vec![
            "Build gen",
            "Build validate",
            "Build judge",
            "Build slow",
            "Build solve"
        ]
    );
}

#[test]
fn test_plan_generator_target_skips_judge_and_solutions() {
    let config = TaskConfig::from_yaml(TASK_YAML).unwrap();

    let jobs = plan_jobs(&config, &env_for(TestingTarget::Generator)).unwrap();

    assert_eq!(names(&jobs), vec!["Build gen", "Build validate"]);
}

#[test]
fn test_plan_solution_target_includes_judge() {
    let config = TaskConfig::from_yaml(TASK_YAML).unwrap();

    let jobs = plan_jobs(&config, &env_for(TestingTarget::Solution)).unwrap();

    assert_eq!(jobs.len(), 5);
    assert!(matches!(&jobs[2], Job::Build(s) if s.section_name == "build_judge"));
}

#[test]
fn test_plan_prebuilt_judges_replace_build() {
    let mut config = TaskConfig::from_yaml(TASK_YAML).unwrap();

    config.out_check = OutCheck::Tokens;
    let jobs = plan_jobs(&config, &Env::default()).unwrap();
    assert_eq!(jobs[2], Job::PrepareJudge(JudgeTool::Token));
    assert!(!names(&jobs).contains(&"Build judge".to_string()));

    config.out_check = OutCheck::Shuffle;
    let jobs = plan_jobs(&config, &Env::default()).unwrap();
    assert_eq!(jobs[2], Job::PrepareJudge(JudgeTool::Shuffle));
    assert_eq!(jobs[2].name(), "Prepare shuffle judge");
}

#[test]
fn test_plan_diff_needs_no_judge() {
    let mut config = TaskConfig::from_yaml(TASK_YAML).unwrap();
    config.out_check = OutCheck::Diff;

    let jobs = plan_jobs(&config, &Env::default()).unwrap();

    assert_eq!(jobs.len(), 4);
    assert!(jobs.iter().all(|j| matches!(j, Job::Build(_))));
}

#[test]
fn test_plan_omits_absent_sections() {
    let config = TaskConfig::from_yaml("out_check: judge\nsolutions:\n  draft: {}\n").unwrap();

    let jobs = plan_jobs(&config, &Env::default()).unwrap();

    assert!(jobs.is_empty());
}

#[test]
fn test_plan_selected_solutions_only() {
    let config = TaskConfig::from_yaml(TASK_YAML).unwrap();
    let env = Env {
        solutions: Some(vec!["solve".to_string()]),
        ..Default::default()
    };

    let jobs = plan_jobs(&config, &env).unwrap();

    assert_eq!(
        names(&jobs),
        vec!["Build gen", "Build validate", "Build judge", "Build solve"]
    );
}

#[test]
fn test_plan_unknown_solution_is_config_error() {
    let config = TaskConfig::from_yaml(TASK_YAML).unwrap();
    let env = Env {
        solutions: Some(vec!["fast".to_string()]),
        ..Default::default()
    };

    let err = plan_jobs(&config, &env).unwrap_err();

    assert!(matches!(err, BuildError::Config(_)));
    assert_eq!(
        err.to_string(),
        "unknown solution 'fast' (declared: draft, slow, solve)"
    );
}

// ============================================================================
// Runner
// ============================================================================

/// Judge preparer returning a fixed result.
struct StubJudge {
    fault: bool,
}

impl JudgePreparer for StubJudge {
    fn prepare(
        &self,
        tool: JudgeTool,
        ctx: &TaskContext,
        _tracker: &mut dyn AccessTracker,
    ) -> Result<PathBuf> {
        if self.fault {
            Err(BuildError::io(
                "failed to write judge",
                std::io::Error::other("disk full"),
            ))
        } else {
            Ok(ctx.build_dir.join(tool.executable()))
        }
    }
}

fn task() -> (TempDir, TaskContext) {
    let temp = TempDir::new().unwrap();
    let ctx = TaskContext::new(temp.path(), &TaskConfig::default());
    (temp, ctx)
}

fn build_job(program: &str) -> Job {
    Job::Build(crate::config::BuildSection::new(
        program,
        vec![program.to_string()],
    ))
}

#[test]
fn test_run_continues_after_failure() {
    let (temp, ctx) = task();
    write_script(temp.path(), "gen.sh", "echo 1");
    let env = Env::default();
    let judge = StubJudge { fault: false };
    let runner = JobRunner::new(&ctx, &env, &judge);
    let jobs = vec![
        build_job("missing"),
        build_job("gen"),
        Job::PrepareJudge(JudgeTool::Token),
    ];

    let reports = run_jobs(&jobs, &runner, &mut AccessLog::new()).unwrap();

    assert_eq!(reports.len(), 3);
    assert_eq!(
        reports[0].outcome,
        JobOutcome::Failed("No paths matching 'missing'.".to_string())
    );
    assert_eq!(
        reports[0].failure_message().unwrap(),
        "Build missing failed: No paths matching 'missing'."
    );
    assert!(reports[1].succeeded());
    assert!(reports[2].succeeded());
    assert!(ctx.target_path("gen").is_file());
}

#[test]
fn test_run_fail_fast_stops_at_first_failure() {
    let (temp, ctx) = task();
    write_script(temp.path(), "gen.sh", "echo 1");
    let env = Env {
        fail_fast: true,
        ..Default::default()
    };
    let judge = StubJudge { fault: false };
    let runner = JobRunner::new(&ctx, &env, &judge);
    let jobs = vec![build_job("missing"), build_job("gen")];

    let reports = run_jobs(&jobs, &runner, &mut AccessLog::new()).unwrap();

    assert_eq!(reports.len(), 1);
    assert!(!reports[0].succeeded());
    assert!(!ctx.target_path("gen").exists());
}

#[test]
fn test_run_aborts_on_fault() {
    let (temp, ctx) = task();
    write_script(temp.path(), "gen.sh", "echo 1");
    let env = Env::default();
    let judge = StubJudge { fault: true };
    let runner = JobRunner::new(&ctx, &env, &judge);
    let jobs = vec![Job::PrepareJudge(JudgeTool::Shuffle), build_job("gen")];

    let err = run_jobs(&jobs, &runner, &mut AccessLog::new()).unwrap_err();

    assert!(err.is_fault());
    assert!(!ctx.target_path("gen").exists());
}

#[test]
fn test_run_aborts_when_staging_is_locked() {
    let (temp, ctx) = task();
    write_script(temp.path(), "gen.sh", "echo 1");
    write_script(temp.path(), "sol.sh", "echo 2");
    let _held = crate::build::StagingArea::acquire(&ctx, "build other").unwrap();
    let env = Env::default();
    let judge = StubJudge { fault: false };
    let runner = JobRunner::new(&ctx, &env, &judge);

    let err = run_jobs(&[build_job("gen"), build_job("sol")], &runner, &mut AccessLog::new())
        .unwrap_err();

    assert!(matches!(err, BuildError::StagingLocked(_)));
}

// ============================================================================
// Pre-built judge helpers
// ============================================================================

#[test]
fn test_prebuilt_judge_is_copied_into_build_dir() {
    let (temp, ctx) = task();
    let helper = write_file(temp.path(), "tools/judge-token", "#!/bin/sh\n");
    let tools = PrebuiltJudgeTools::new(Some(temp.path().join("tools")));
    let mut log = AccessLog::new();

    let target = tools.prepare(JudgeTool::Token, &ctx, &mut log).unwrap();

    assert_eq!(target, ctx.build_dir.join("judge-token"));
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "#!/bin/sh\n");
    let accessed: Vec<&std::path::Path> = log.paths().collect();
    assert_eq!(accessed, vec![target.as_path(), helper.as_path()]);
}

#[test]
fn test_prebuilt_judge_dir_from_config() {
    let (temp, ctx) = task();
    write_file(temp.path(), "judges/judge-shuffle", "");
    let config = TaskConfig::from_yaml("judge_tools_dir: judges\n").unwrap();
    let tools = PrebuiltJudgeTools::from_config(&ctx, &config);

    let target = tools
        .prepare(JudgeTool::Shuffle, &ctx, &mut AccessLog::new())
        .unwrap();

    assert!(target.ends_with("build/judge-shuffle"));
}

#[test]
fn test_prebuilt_judge_requires_configured_dir() {
    let (_temp, ctx) = task();
    let tools = PrebuiltJudgeTools::default();

    let err = tools
        .prepare(JudgeTool::Token, &ctx, &mut AccessLog::new())
        .unwrap_err();

    assert!(matches!(err, BuildError::JudgePreparation(_)));
    assert!(!err.is_fault());
}

#[test]
fn test_prebuilt_judge_missing_helper() {
    let (temp, ctx) = task();
    std::fs::create_dir_all(temp.path().join("tools")).unwrap();
    let tools = PrebuiltJudgeTools::new(Some(temp.path().join("tools")));

    let err = tools
        .prepare(JudgeTool::Shuffle, &ctx, &mut AccessLog::new())
        .unwrap_err();

    assert!(err.to_string().contains("judge-shuffle not found"));
}
