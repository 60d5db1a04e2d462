//! Dry-run command implementation.
//!
//! The `procexec dry-run` command prints the built command line.

use std::io::Write;

use crate::cli::args::CommandLineArgs;

use super::dispatcher::{Command, CommandResult};

/// The dry-run command implementation.
pub struct DryRunCommand {
    args: CommandLineArgs,
}

impl DryRunCommand {
    pub fn new(args: CommandLineArgs) -> Self {
        Self { args }
    }
}

impl Command for DryRunCommand {
    fn execute(&self, out: &mut dyn Write) -> anyhow::Result<CommandResult> {
        writeln!(out, "{}", super::build_exec(&self.args).dry_run())?;
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_escaped_command_line() {
        let cmd = DryRunCommand::new(CommandLineArgs {
            command: "echo".into(),
            args: vec!["one".into(), " two ".into()],
        });
        let mut out = Vec::new();
        cmd.execute(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "echo one two 2>&1\n");
    }
}
