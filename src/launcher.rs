//! Process creation.
//!
//! Command lines are always handed to a shell. The working directory is set
//! on the spawned process itself, so the caller's current directory is never
//! touched.

use crate::config::ShellConfig;
use crate::error::{ExecError, Result};
use std::path::Path;
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};

/// Parent-side ends of the three standard streams of a child.
#[derive(Debug)]
pub struct PipeSet {
    pub stdin: Option<ChildStdin>,
    pub stdout: Option<ChildStdout>,
    pub stderr: Option<ChildStderr>,
}

impl PipeSet {
    /// Close every handle still open. Safe to call more than once.
    pub fn close(&mut self) {
        drop(self.stdin.take());
        drop(self.stdout.take());
        drop(self.stderr.take());
    }

    /// Whether every handle has been closed.
    pub fn is_closed(&self) -> bool {
        self.stdin.is_none() && self.stdout.is_none() && self.stderr.is_none()
    }
}

/// Build the shell invocation for `command_line`.
fn shell_command(command_line: &str, cwd: Option<&Path>, shell: &ShellConfig) -> Command {
    let mut cmd = Command::new(&shell.program);
    cmd.args(&shell.args);
    cmd.arg(command_line);

    if let Some(cwd) = cwd {
        cmd.current_dir(cwd);
    }

    cmd
}

/// Run `command_line` to completion and collect its stdout lines.
///
/// stdin is closed from the start. stderr is inherited, so callers that want
/// it captured put `2>&1` on the command line. Each line has trailing
/// whitespace removed.
pub fn capture(
    command_line: &str,
    cwd: Option<&Path>,
    shell: &ShellConfig,
) -> Result<(i32, Vec<String>)> {
    tracing::debug!("Executing command: {}", command_line);

    let output = shell_command(command_line, cwd, shell)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .output()
        .map_err(|source| ExecError::Launch {
            command: command_line.to_string(),
            source,
        })?;

    let code = exit_code(output.status);
    let lines = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| line.trim_end().to_string())
        .collect();

    tracing::debug!("Command exited with code {}: {}", code, command_line);
    Ok((code, lines))
}

/// Start `command_line` with stdin and stdout piped.
///
/// stderr is inherited: nothing reads it, and a piped stderr would stall a
/// child once the pipe buffer fills. [`PipeSet::stderr`] is always `None`.
pub fn spawn_piped(
    command_line: &str,
    cwd: Option<&Path>,
    shell: &ShellConfig,
) -> Result<(Child, PipeSet)> {
    tracing::debug!("Starting agent command: {}", command_line);

    let launch_error = |source| ExecError::Launch {
        command: command_line.to_string(),
        source,
    };

    let mut child = shell_command(command_line, cwd, shell)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(launch_error)?;

    let pipes = PipeSet {
        stdin: child.stdin.take(),
        stdout: child.stdout.take(),
        stderr: child.stderr.take(),
    };

    if pipes.stdin.is_none() || pipes.stdout.is_none() {
        let mut pipes = pipes;
        pipes.close();
        let _ = child.kill();
        if let Err(err) = child.wait() {
            tracing::warn!("Failed to reap child without pipes: {}", err);
        }
        return Err(launch_error(std::io::Error::other("missing child pipes")));
    }

    Ok((child, pipes))
}

/// Numeric exit status. A child killed by a signal reports `128 + signal`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    crate::error::LAUNCH_FAILURE_CODE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn capture_collects_trimmed_lines() {
        let (code, lines) = capture("printf 'a  \\nb\\n'", None, &ShellConfig::default()).unwrap();
        assert_eq!(code, 0);
        assert_eq!(lines, vec!["a".to_string(), "b".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn capture_reports_exit_code() {
        let (code, lines) = capture("exit 3", None, &ShellConfig::default()).unwrap();
        assert_eq!(code, 3);
        assert!(lines.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn capture_runs_in_working_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let expected = temp.path().canonicalize().unwrap();
        let (_, lines) = capture("pwd -P", Some(temp.path()), &ShellConfig::default()).unwrap();
        assert_eq!(lines, vec![expected.to_string_lossy().into_owned()]);
    }

    #[test]
    fn missing_shell_is_a_launch_failure() {
        let shell = ShellConfig::new("/definitely/not/a/shell", ["-c"]);
        let err = capture("true", None, &shell).unwrap_err();
        assert!(matches!(err, ExecError::Launch { .. }));
        assert_eq!(err.command(), Some("true"));
    }

    #[cfg(unix)]
    #[test]
    fn spawn_piped_pipes_stdin_and_stdout_only() {
        let (mut child, mut pipes) = spawn_piped("cat", None, &ShellConfig::default()).unwrap();
        assert!(pipes.stdin.is_some());
        assert!(pipes.stdout.is_some());
        assert!(pipes.stderr.is_none());
        pipes.close();
        assert!(pipes.is_closed());
        assert_eq!(exit_code(child.wait().unwrap()), 0);
    }

    #[cfg(unix)]
    #[test]
    fn signalled_child_reports_128_plus_signal() {
        let (code, _) = capture("kill -9 $$", None, &ShellConfig::default()).unwrap();
        assert_eq!(code, 137);
    }
}
