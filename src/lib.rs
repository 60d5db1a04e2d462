//! procexec - build shell command lines and drive child processes.
//!
//! Two execution modes share one command builder:
//!
//! - [`Exec::run`] runs a command to completion and returns its combined
//!   output lines, failing with [`ExecError::NonZeroExit`] on a non-zero exit.
//! - [`Exec::run_agent`] drives a long-lived child interactively: a callback
//!   receives each drained chunk of output and answers with a [`Reply`].
//!
//! # Modules
//!
//! - [`agent`] - Interactive agent sessions
//! - [`cli`] - Command-line interface and argument parsing
//! - [`command`] - Command construction and synchronous execution
//! - [`config`] - Shell and agent-session settings
//! - [`error`] - Error types and result aliases
//! - [`launcher`] - Process creation
//! - [`pipe`] - OS-level pipe queries
//! - [`quote`] - Argument normalization and shell quoting
//!
//! # Example
//!
//! ```
//! use procexec::Exec;
//!
//! let line = Exec::new("echo").arg("hello").dry_run();
//! assert_eq!(line, "echo hello 2>&1");
//! ```

pub mod agent;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod launcher;
pub mod pipe;
pub mod quote;

pub use agent::{AgentSession, Reply, TerminationSignal};
pub use command::{Exec, ExecResult};
pub use config::{AgentOptions, ShellConfig};
pub use error::{ExecError, Result};
