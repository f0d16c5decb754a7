//! Exit code constants for the taskbuild CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid task configuration)
//! - 2: At least one build job failed
//! - 3: Staging area is locked by another process
//! - 70: Internal fault (a defect in taskbuild itself)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or an invalid task configuration.
pub const USER_ERROR: i32 = 1;

/// One or more build jobs failed with a recoverable error.
pub const BUILD_FAILURE: i32 = 2;

/// The staging lock is held by another process.
pub const LOCK_FAILURE: i32 = 3;

/// Internal fault: ambiguous strategy catalog or unexpected I/O failure.
pub const INTERNAL_FAULT: i32 = 70;
