//! Exit code constants for the runlet CLI.
//!
//! The CLI process mirrors the outcome of the executed run:
//! - 0: Success (script exited zero)
//! - 1: User error (bad args, ambiguous payload, missing preconditions)
//! - 2: Script failure (the script ran and exited nonzero)
//! - 3: Spawn failure (interpreter missing or unexecutable)
//! - 4: Timeout (script killed after exceeding its deadline)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid request, or failed precondition.
pub const USER_ERROR: i32 = 1;

/// Script failure: the child process ran to completion with a nonzero exit.
pub const SCRIPT_FAILURE: i32 = 2;

/// Spawn failure: the interpreter could not be started at all.
pub const SPAWN_FAILURE: i32 = 3;

/// Timeout: the child process tree was killed after the deadline.
pub const TIMEOUT: i32 = 4;
