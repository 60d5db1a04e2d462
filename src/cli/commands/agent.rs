//! Agent command implementation.
//!
//! The `procexec agent` command echoes every output chunk of the child and
//! answers it with the next `--send` line. When the lines run out the session
//! is interrupted, which ends it without an error.

use std::io::Write;

use crate::cli::args::AgentArgs;
use crate::{Reply, TerminationSignal};

use super::dispatcher::{Command, CommandResult};

/// The agent command implementation.
pub struct AgentCommand {
    args: AgentArgs,
}

impl AgentCommand {
    pub fn new(args: AgentArgs) -> Self {
        Self { args }
    }
}

impl Command for AgentCommand {
    fn execute(&self, out: &mut dyn Write) -> anyhow::Result<CommandResult> {
        let mut exec = super::build_exec(&self.args.command_line);
        if let Some(cwd) = &self.args.cwd {
            exec = exec.working_directory(cwd)?;
        }

        let mut inputs = self.args.send.iter();
        let code = exec.run_agent(|output, _| {
            if let Err(err) = out.write_all(output.as_bytes()).and_then(|()| out.flush()) {
                return Reply::Fail(err.into());
            }
            match inputs.next() {
                Some(line) => Reply::send(format!("{line}\n")),
                None => TerminationSignal::interrupt().into(),
            }
        })?;

        Ok(CommandResult::from_exit_code(code))
    }
}
