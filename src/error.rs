//! Error types for command execution.
//!
//! This module defines [`ExecError`], the error type returned by every
//! fallible operation in the crate, and a [`Result`] type alias.
//!
//! # Error Handling Strategy
//!
//! - Configuration problems fail before anything is spawned
//! - Launch and exit-code failures carry the full command line and output
//! - Agent callback failures surface only after the child has been reaped

use std::path::PathBuf;
use thiserror::Error;

/// Exit code reported when no child exit status exists (spawn or pipe failure).
pub const LAUNCH_FAILURE_CODE: i32 = -1;

/// Core error type for command execution.
#[derive(Debug, Error)]
pub enum ExecError {
    /// Working directory does not exist when configured.
    #[error("Directory '{}' is not found.", .path.display())]
    InvalidWorkingDirectory { path: PathBuf },

    /// The shell or its pipes could not be created.
    #[error("Cannot start process: {command}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Synchronous run finished with an exit code above zero.
    #[error("{}", failure_message(.command, .output, .code))]
    NonZeroExit {
        command: String,
        output: String,
        code: i32,
    },

    /// Agent callback ended the session with a failure.
    #[error("Agent session for '{command}' aborted with code {code}: {source}")]
    Aborted {
        command: String,
        code: i32,
        #[source]
        source: anyhow::Error,
    },

    /// Pipe I/O failed while the agent session was running.
    #[error("I/O error while driving '{command}': {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl ExecError {
    /// The fully built command line, when a launch was attempted.
    pub fn command(&self) -> Option<&str> {
        match self {
            ExecError::InvalidWorkingDirectory { .. } => None,
            ExecError::Launch { command, .. }
            | ExecError::NonZeroExit { command, .. }
            | ExecError::Aborted { command, .. }
            | ExecError::Io { command, .. } => Some(command),
        }
    }

    /// Output captured before the failure. Empty for everything but
    /// [`ExecError::NonZeroExit`].
    pub fn output(&self) -> &str {
        match self {
            ExecError::NonZeroExit { output, .. } => output,
            _ => "",
        }
    }

    /// Numeric code of the failure.
    ///
    /// The child's exit status for [`ExecError::NonZeroExit`], the signal
    /// code for [`ExecError::Aborted`], and [`LAUNCH_FAILURE_CODE`] when no
    /// exit status exists.
    pub fn code(&self) -> Option<i32> {
        match self {
            ExecError::InvalidWorkingDirectory { .. } => None,
            ExecError::Launch { .. } | ExecError::Io { .. } => Some(LAUNCH_FAILURE_CODE),
            ExecError::NonZeroExit { code, .. } | ExecError::Aborted { code, .. } => Some(*code),
        }
    }
}

fn failure_message(command: &str, output: &str, code: &i32) -> String {
    if output.is_empty() {
        format!("Command failed with exit code {code}: {command}")
    } else {
        output.to_string()
    }
}

/// Result type alias for command execution.
pub type Result<T> = std::result::Result<T, ExecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_working_directory_displays_path() {
        let err = ExecError::InvalidWorkingDirectory {
            path: PathBuf::from("/foo/nope"),
        };
        assert_eq!(err.to_string(), "Directory '/foo/nope' is not found.");
        assert_eq!(err.code(), None);
        assert_eq!(err.command(), None);
    }

    #[test]
    fn non_zero_exit_message_is_captured_output() {
        let err = ExecError::NonZeroExit {
            command: "bin/fail 2>&1".into(),
            output: "First line\nSecond line".into(),
            code: 10,
        };
        assert_eq!(err.to_string(), "First line\nSecond line");
        assert_eq!(err.code(), Some(10));
        assert_eq!(err.command(), Some("bin/fail 2>&1"));
        assert_eq!(err.output(), "First line\nSecond line");
    }

    #[test]
    fn non_zero_exit_without_output_names_command() {
        let err = ExecError::NonZeroExit {
            command: "false 2>&1".into(),
            output: String::new(),
            code: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("false 2>&1"));
        assert!(msg.contains('1'));
    }

    #[test]
    fn launch_failure_uses_sentinel_code() {
        let err = ExecError::Launch {
            command: "nope".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.code(), Some(LAUNCH_FAILURE_CODE));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn aborted_keeps_source() {
        let err = ExecError::Aborted {
            command: "cat".into(),
            code: 134,
            source: anyhow::anyhow!("bad prompt"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cat"));
        assert!(msg.contains("134"));
        assert!(msg.contains("bad prompt"));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(ExecError::InvalidWorkingDirectory {
                path: PathBuf::from("x"),
            })
        }
        assert!(returns_error().is_err());
    }
}
