//! Command construction and execution.
//!
//! ```no_run
//! use procexec::{Exec, Reply};
//!
//! let res = Exec::new("ping")
//!     .arg("127.0.0.1")
//!     .arg("-c 3")
//!     .working_directory("..")?
//!     .run()?;
//! assert_eq!(res.exit_code, 0);
//!
//! let code = Exec::new("bin/readwrite").run_agent(|out, _err| {
//!     print!("> {out}");
//!     Reply::send("Hi\n")
//! })?;
//! # let _ = code;
//! # Ok::<(), procexec::ExecError>(())
//! ```

use crate::agent::{AgentSession, Reply};
use crate::config::{AgentOptions, ShellConfig};
use crate::error::{ExecError, Result};
use crate::launcher;
use crate::quote::quote_argument;
use std::path::{Path, PathBuf};

/// Token that merges stderr into stdout.
pub const REDIRECT_STDERR: &str = "2>&1";

/// Result of a successful synchronous run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Exit code (always 0 for a returned result).
    pub exit_code: i32,

    /// Combined stdout/stderr, one entry per line.
    pub lines: Vec<String>,
}

/// An external command to build and run through the shell.
#[derive(Debug, Clone)]
pub struct Exec {
    command: String,
    arguments: Vec<String>,
    working_directory: Option<PathBuf>,
    shell: ShellConfig,
    agent: AgentOptions,
}

impl Exec {
    /// Create a command. `command` may already contain arguments.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            arguments: Vec::new(),
            working_directory: None,
            shell: ShellConfig::from_env(),
            agent: AgentOptions::default(),
        }
    }

    /// Append an argument.
    ///
    /// Surrounding spaces, tabs and newlines are trimmed. An argument starting
    /// with `'` has its first and last character removed and the rest escaped
    /// for the shell.
    pub fn arg(mut self, arg: &str) -> Self {
        self.arguments.push(quote_argument(arg));
        self
    }

    /// Run the command in `dir`. Fails if `dir` is not an existing directory.
    pub fn working_directory(mut self, dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ExecError::InvalidWorkingDirectory {
                path: dir.to_path_buf(),
            });
        }
        self.working_directory = Some(dir.to_path_buf());
        Ok(self)
    }

    /// Override the shell that interprets the command line.
    pub fn shell(mut self, shell: ShellConfig) -> Self {
        self.shell = shell;
        self
    }

    /// Override agent read-loop tuning.
    pub fn agent_options(mut self, options: AgentOptions) -> Self {
        self.agent = options;
        self
    }

    /// Build the command line, optionally ending with `2>&1`.
    pub fn build(&self, redirect_stderr: bool) -> String {
        let mut tokens = vec![self.command.as_str()];
        tokens.extend(
            self.arguments
                .iter()
                .map(String::as_str)
                .filter(|arg| !arg.is_empty()),
        );
        if redirect_stderr {
            tokens.push(REDIRECT_STDERR);
        }
        tokens.join(" ")
    }

    /// The command line [`Exec::run`] would execute.
    pub fn dry_run(&self) -> String {
        self.build(true)
    }

    /// Run to completion, capturing combined output.
    ///
    /// Returns [`ExecError::NonZeroExit`] when the exit code is above zero.
    pub fn run(&self) -> Result<ExecResult> {
        let command = self.build(true);
        let (code, lines) =
            launcher::capture(&command, self.working_directory.as_deref(), &self.shell)?;

        if code > 0 {
            return Err(ExecError::NonZeroExit {
                command,
                output: lines.join("\n"),
                code,
            });
        }

        Ok(ExecResult {
            exit_code: code,
            lines,
        })
    }

    /// Start the command for an agent session without running it yet.
    pub fn spawn_agent(&self) -> Result<AgentSession> {
        AgentSession::spawn(
            self.build(false),
            self.working_directory.as_deref(),
            &self.shell,
            self.agent,
        )
    }

    /// Drive the command interactively with `callback` and return its exit
    /// status. See [`AgentSession::run`].
    pub fn run_agent<F>(&self, callback: F) -> Result<i32>
    where
        F: FnMut(&str, &str) -> Reply,
    {
        self.spawn_agent()?.run(callback)
    }
}
