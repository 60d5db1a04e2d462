//! Shell and agent-session settings.
//!
//! There is no configuration file. Every setting has a default, and the shell
//! can be overridden through the `PROCEXEC_SHELL` environment variable.

use std::ffi::OsString;
use std::time::Duration;

/// Environment variable naming the shell used to interpret command lines.
pub const SHELL_ENV: &str = "PROCEXEC_SHELL";

/// Default number of bytes requested per pipe read.
pub const CHUNK_SIZE: usize = 16_384;

/// Default pause between agent iterations when the callback sends nothing.
pub const BACKOFF: Duration = Duration::from_millis(1);

/// Shell used to interpret a built command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Shell executable.
    pub program: OsString,

    /// Arguments placed before the command line (e.g. `-c`).
    pub args: Vec<OsString>,
}

impl ShellConfig {
    /// Create a shell configuration from a program and its leading arguments.
    pub fn new<I, S>(program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Platform default, with the program replaced by `PROCEXEC_SHELL` if set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(program) = std::env::var_os(SHELL_ENV).filter(|p| !p.is_empty()) {
            tracing::debug!("Using shell from {}: {:?}", SHELL_ENV, program);
            config.program = program;
        }
        config
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        if cfg!(target_os = "windows") {
            Self::new("cmd", ["/C"])
        } else {
            Self::new("sh", ["-c"])
        }
    }
}

/// Tuning for the agent read loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentOptions {
    /// Upper bound on bytes requested per read.
    pub chunk_size: usize,

    /// How long to wait for new output when the callback sends no input.
    pub backoff: Duration,
}

impl AgentOptions {
    /// Set the read chunk size. Zero is clamped to one byte.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the idle backoff.
    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            backoff: BACKOFF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn default_shell_is_sh_dash_c() {
        let shell = ShellConfig::default();
        assert_eq!(shell.program, OsString::from("sh"));
        assert_eq!(shell.args, vec![OsString::from("-c")]);
    }

    #[test]
    fn agent_defaults_match_constants() {
        let options = AgentOptions::default();
        assert_eq!(options.chunk_size, 16_384);
        assert_eq!(options.backoff, Duration::from_millis(1));
    }

    #[test]
    fn zero_chunk_size_is_clamped() {
        let options = AgentOptions::default().chunk_size(0);
        assert_eq!(options.chunk_size, 1);
    }

    #[test]
    fn shell_from_env_honours_override() {
        let saved = std::env::var_os(SHELL_ENV);
        std::env::set_var(SHELL_ENV, "/bin/sh");
        let shell = ShellConfig::from_env();
        match saved {
            Some(value) => std::env::set_var(SHELL_ENV, value),
            None => std::env::remove_var(SHELL_ENV),
        }
        assert_eq!(shell.program, OsString::from("/bin/sh"));
        assert_eq!(shell.args, ShellConfig::default().args);
    }
}
