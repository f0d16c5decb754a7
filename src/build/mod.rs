//! Building programs from their build sections.
//!
//! A build goes through these steps, in order:
//!
//! 1. Resolve every source pattern to existing paths ([`resolve_sources`])
//!    and reject sets mixing files and directories.
//! 2. Select a strategy: the named one, or the single auto-eligible one that
//!    applies ([`select_strategy`]).
//! 3. Resolve the extra files of every category the strategy declares.
//! 4. Acquire the staging area, emptying it, and copy every source into it
//!    under its logical name.
//! 5. Remove the previously published target, run the strategy, and copy
//!    the artifact it reports to `<build_dir>/<program_name>`.

mod executor;
mod lock;
mod sources;
mod staging;
mod strategy;


pub use executor::{BuiltProgram, ProgramBuilder};
pub use sources::{SourcePath, check_source_kinds, resolve_glob, resolve_sources};
pub use staging::StagingArea;
pub use strategy::{
    ALL_STRATEGIES, AUTO_STRATEGIES, BuildInput, FAILURE_MAX_CHARS, FAILURE_MAX_LINES, Strategy,
    detect_strategy, known_extra_categories, select_strategy,
};
