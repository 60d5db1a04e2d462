//! Run command implementation.
//!
//! The `procexec run` command executes a command to completion, prints its
//! output, and exits with the command's exit code. When the command fails its
//! output goes to stderr instead of stdout.

use std::io::Write;

use crate::cli::args::RunArgs;
use crate::ExecError;

use super::dispatcher::{Command, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    args: RunArgs,
}

impl RunCommand {
    pub fn new(args: RunArgs) -> Self {
        Self { args }
    }
}

impl Command for RunCommand {
    fn execute(&self, out: &mut dyn Write) -> anyhow::Result<CommandResult> {
        let mut exec = super::build_exec(&self.args.command_line);
        if let Some(cwd) = &self.args.cwd {
            exec = exec.working_directory(cwd)?;
        }

        match exec.run() {
            Ok(res) => {
                for line in &res.lines {
                    writeln!(out, "{line}")?;
                }
                Ok(CommandResult::success())
            }
            Err(ExecError::NonZeroExit { output, code, .. }) => {
                if !output.is_empty() {
                    eprintln!("{output}");
                }
                tracing::debug!("Command exited with code {}", code);
                Ok(CommandResult::failure(code))
            }
            Err(err) => Err(err.into()),
        }
    }
}
