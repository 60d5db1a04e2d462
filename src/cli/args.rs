//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// procexec - Build shell commands and drive child processes.
#[derive(Debug, Parser)]
#[command(name = "procexec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a command to completion and print its output
    Run(RunArgs),

    /// Print the command line that `run` would execute
    DryRun(CommandLineArgs),

    /// Drive a command interactively, answering each output chunk
    Agent(AgentArgs),
}

/// Base command plus arguments, shared by every subcommand.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CommandLineArgs {
    /// Command to execute (may include its own arguments)
    pub command: String,

    /// Arguments appended after the command; wrap in single quotes to escape
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Working directory for the command
    #[arg(short = 'C', long = "cwd", value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    #[command(flatten)]
    pub command_line: CommandLineArgs,
}

/// Arguments for the `agent` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct AgentArgs {
    /// Working directory for the command
    #[arg(short = 'C', long = "cwd", value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Line to send after each output chunk, in order (repeatable)
    #[arg(short, long = "send", value_name = "LINE")]
    pub send: Vec<String>,

    #[command(flatten)]
    pub command_line: CommandLineArgs,
}
