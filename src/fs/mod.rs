//! Filesystem utilities for taskbuild.
//!
//! This module provides the copy and removal operations used when staging
//! sources and publishing built programs.

mod copy;

pub use copy::{copy_entry, recreate_dir, remove_entry};
