//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.

pub mod agent;
pub mod dispatcher;
pub mod dry_run;
pub mod run;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};

use crate::cli::args::CommandLineArgs;
use crate::Exec;

/// Build an [`Exec`] from the shared command-line arguments.
fn build_exec(args: &CommandLineArgs) -> Exec {
    args.args
        .iter()
        .fold(Exec::new(&args.command), |exec, arg| exec.arg(arg))
}
