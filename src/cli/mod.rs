//! CLI argument parsing for taskbuild.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use taskbuild::env::{Env, TestingTarget};

/// Taskbuild: builds the programs of a programming-competition task.
///
/// Programs are declared in `task.yaml`:
/// - each build section names its sources and, optionally, a strategy
/// - sources are staged into a clean directory and built there
/// - built programs are published to the build directory
#[derive(Parser, Debug)]
#[command(name = "taskbuild")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Task directory containing task.yaml (default: current directory).
    #[arg(long, global = true)]
    pub task_dir: Option<PathBuf>,

    /// Disable colored compiler diagnostics.
    #[arg(long, global = true)]
    pub plain: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for taskbuild.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the jobs a build would run.
    ///
    /// Lists the generator, validator, judge and solution builds selected
    /// by the testing target, without building anything.
    Plan(SelectArgs),

    /// Build the task's programs.
    ///
    /// Runs every planned job in sequence and publishes the built programs
    /// to the build directory.
    Build(BuildArgs),
}

/// Selection of the programs to work on.
#[derive(Parser, Debug)]
pub struct SelectArgs {
    /// What is being tested.
    #[arg(short, long, value_enum, default_value_t = TestingTarget::All)]
    pub target: TestingTarget,

    /// Solutions to include (default: all declared solutions).
    #[arg(short, long, value_delimiter = ',')]
    pub solution: Vec<String>,
}

/// Arguments for the `build` command.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    /// Stop after the first failed job.
    #[arg(long)]
    pub fail_fast: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Run-time environment for the given selection.
    pub fn env(&self, select: &SelectArgs, fail_fast: bool) -> Env {
        Env {
            target: select.target,
            solutions: if select.solution.is_empty() {
                None
            } else {
                Some(select.solution.clone())
            },
            plain: self.plain,
            fail_fast,
        }
    }
}
