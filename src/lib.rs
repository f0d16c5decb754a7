//! Taskbuild: the program-build subsystem of a task-development pipeline.
//!
//! Given the build sections of a task (generator, validator, judge and
//! solutions), taskbuild locates their sources, picks a build strategy,
//! builds each program in a freshly emptied staging directory and publishes
//! the result to `<build_dir>/<program_name>`.

pub mod access;
pub mod build;
pub mod config;
pub mod context;
pub mod env;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod jobs;

#[cfg(test)]
pub(crate) mod test_support;
