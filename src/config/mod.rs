//! Task configuration for taskbuild.
//!
//! This module defines the TaskConfig struct that represents `task.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for optional fields, and validation of build sections
//! against the strategy catalog.

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::TaskConfig;
pub use operations::validate_build_section;
pub use types::{BuildSection, OutCheck, RunConfig, SolutionConfig, StrategyChoice};
