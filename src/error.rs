//! Error types for the runlet CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for runlet operations.
///
/// Each variant maps to a specific exit code. Only `UserError` aborts a run
/// before anything is spawned; the other variants are produced *after* the
/// run outcome has been captured, summarized, and persisted, so the process
/// exit code mirrors what happened to the child.
#[derive(Error, Debug)]
pub enum RunletError {
    /// User provided invalid arguments or a precondition failed.
    #[error("{0}")]
    UserError(String),

    /// The script ran to completion but exited with a nonzero code.
    #[error("script exited with code {0}")]
    ScriptFailure(i32),

    /// The interpreter could not be spawned at all.
    #[error("failed to spawn interpreter: {0}")]
    SpawnFailure(String),

    /// The script exceeded its deadline and was killed.
    #[error("execution timed out after {0} seconds")]
    Timeout(f64),
}

impl RunletError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunletError::UserError(_) => exit_codes::USER_ERROR,
            RunletError::ScriptFailure(_) => exit_codes::SCRIPT_FAILURE,
            RunletError::SpawnFailure(_) => exit_codes::SPAWN_FAILURE,
            RunletError::Timeout(_) => exit_codes::TIMEOUT,
        }
    }
}

/// Result type alias for runlet operations.
pub type Result<T> = std::result::Result<T, RunletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_has_correct_exit_code() {
        let err = RunletError::UserError("bad argument".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn script_failure_has_correct_exit_code() {
        let err = RunletError::ScriptFailure(7);
        assert_eq!(err.exit_code(), exit_codes::SCRIPT_FAILURE);
    }

    #[test]
    fn spawn_failure_has_correct_exit_code() {
        let err = RunletError::SpawnFailure("No such file".to_string());
        assert_eq!(err.exit_code(), exit_codes::SPAWN_FAILURE);
    }

    #[test]
    fn timeout_has_correct_exit_code() {
        let err = RunletError::Timeout(5.0);
        assert_eq!(err.exit_code(), exit_codes::TIMEOUT);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = RunletError::ScriptFailure(7);
        assert_eq!(err.to_string(), "script exited with code 7");

        let err = RunletError::Timeout(2.5);
        assert_eq!(err.to_string(), "execution timed out after 2.5 seconds");
    }
}
