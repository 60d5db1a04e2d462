//! Command-line interface for procexec.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{AgentArgs, Cli, CommandLineArgs, Commands, RunArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
