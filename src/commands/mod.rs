//! Command implementations for taskbuild.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Each command writes its report to stdout; errors are
//! returned to `main`, which maps them to exit codes.

mod build;
mod plan;

use crate::cli::{Cli, Command};
use std::io;
use taskbuild::context::load_task;
use taskbuild::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(cli: &Cli) -> Result<()> {
    let (ctx, config) = load_task(cli.task_dir.as_deref())?;
    let mut out = io::stdout().lock();

    match &cli.command {
        Command::Plan(args) => plan::cmd_plan(&config, &cli.env(args, false), &mut out),
        Command::Build(args) => build::cmd_build(
            &ctx,
            &config,
            &cli.env(&args.select, args.fail_fast),
            &mut out,
        ),
    }
}
