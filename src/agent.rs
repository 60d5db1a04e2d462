//! Interactive agent sessions.
//!
//! An [`AgentSession`] drives one child process over pipes. Each iteration
//! drains everything the child has already written, hands it to a callback
//! as one chunk, and writes the callback's reply back to the child's stdin.
//! The callback ends the session by returning [`Reply::Stop`] (a normal,
//! silent exit) or [`Reply::Fail`] (propagated as [`ExecError::Aborted`]).
//!
//! Whatever way the loop ends, including a panicking callback, the pipes are
//! closed and the child is reaped before control returns.
//!
//! The child's stderr is inherited, not read: the callback's `error`
//! argument is always empty.

use crate::config::{AgentOptions, ShellConfig};
use crate::error::{ExecError, Result};
use crate::launcher::{self, PipeSet};
use crate::pipe;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::process::Child;
use thiserror::Error;

/// Signal code for a caller interrupt (`^C`). Graceful.
pub const SIGNAL_INTERRUPT: i32 = 130;

/// Signal code for an aborted session. Fatal.
pub const SIGNAL_PROCESS_ABORTED: i32 = 134;

/// Code reported for callback failures that carry no signal.
const CALLBACK_FAILURE_CODE: i32 = 1;

/// Upper bound on one drained chunk, in multiples of the read size.
const MAX_DRAIN_CHUNKS: usize = 64;

/// Control value a callback uses to end the session.
///
/// Only [`SIGNAL_INTERRUPT`] is graceful; every other code is a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason} (signal {code})")]
pub struct TerminationSignal {
    pub code: i32,
    pub reason: String,
}

impl TerminationSignal {
    pub fn new(code: i32, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Graceful stop requested by the caller.
    pub fn interrupt() -> Self {
        Self::new(SIGNAL_INTERRUPT, "Interrupt")
    }

    /// Fatal stop.
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::new(SIGNAL_PROCESS_ABORTED, reason)
    }

    pub fn is_graceful(&self) -> bool {
        self.code == SIGNAL_INTERRUPT
    }
}

/// What the callback wants the session to do next.
#[derive(Debug)]
pub enum Reply {
    /// Keep going, optionally sending input to the child first.
    Continue(Option<String>),
    /// End the session normally.
    Stop,
    /// End the session with an error.
    Fail(anyhow::Error),
}

impl Reply {
    /// Send `input` to the child and keep going.
    pub fn send(input: impl Into<String>) -> Self {
        Reply::Continue(Some(input.into()))
    }

    /// Send nothing; wait for more output.
    pub fn wait() -> Self {
        Reply::Continue(None)
    }
}

impl From<TerminationSignal> for Reply {
    fn from(signal: TerminationSignal) -> Self {
        if signal.is_graceful() {
            Reply::Stop
        } else {
            Reply::Fail(signal.into())
        }
    }
}

impl From<anyhow::Error> for Reply {
    fn from(err: anyhow::Error) -> Self {
        Reply::Fail(err)
    }
}

impl From<String> for Reply {
    fn from(input: String) -> Self {
        Reply::Continue(Some(input))
    }
}

impl From<&str> for Reply {
    fn from(input: &str) -> Self {
        Reply::Continue(Some(input.to_string()))
    }
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running,
    Closing,
    Terminated,
}

/// A running child process driven by a callback.
#[derive(Debug)]
pub struct AgentSession {
    command: String,
    child: Option<Child>,
    pipes: PipeSet,
    options: AgentOptions,
    state: State,
    eof: bool,
    /// Incomplete UTF-8 sequence held back from the previous chunk.
    pending: Vec<u8>,
    exit_code: Option<i32>,
}

impl AgentSession {
    /// Start `command_line` through `shell` with all three streams piped.
    pub fn spawn(
        command_line: impl Into<String>,
        cwd: Option<&Path>,
        shell: &ShellConfig,
        options: AgentOptions,
    ) -> Result<Self> {
        let command = command_line.into();
        let (child, pipes) = launcher::spawn_piped(&command, cwd, shell)?;

        Ok(Self {
            command,
            child: Some(child),
            pipes,
            options,
            state: State::Running,
            eof: false,
            pending: Vec::new(),
            exit_code: None,
        })
    }

    /// The command line the child was started with.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// OS process id of the child.
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    /// Drive the child until its stdout closes or the callback ends the
    /// session. Returns the child's exit status.
    ///
    /// The callback receives `(output, error)` for every iteration and
    /// returns a [`Reply`].
    pub fn run<F>(mut self, mut callback: F) -> Result<i32>
    where
        F: FnMut(&str, &str) -> Reply,
    {
        let outcome = self.drive(&mut callback);
        let status = self.finish();

        match outcome {
            Ok(()) => status,
            Err(err) => {
                if let Err(cleanup) = status {
                    tracing::warn!("Cleanup after failed session also failed: {}", cleanup);
                }
                Err(err)
            }
        }
    }

    fn drive<F>(&mut self, callback: &mut F) -> Result<()>
    where
        F: FnMut(&str, &str) -> Reply,
    {
        while self.state == State::Running {
            if self.eof {
                tracing::trace!("Child closed stdout: {}", self.command);
                self.state = State::Closing;
                break;
            }

            let output = self.drain()?;
            tracing::trace!("Delivering {} bytes of output", output.len());

            match callback(&output, "") {
                Reply::Continue(Some(input)) if !input.is_empty() => self.send(&input)?,
                Reply::Continue(_) => self.idle(),
                Reply::Stop => {
                    tracing::debug!("Agent session stopped by callback: {}", self.command);
                    self.state = State::Closing;
                }
                Reply::Fail(source) => {
                    let signal = source.downcast_ref::<TerminationSignal>();
                    if signal.is_some_and(TerminationSignal::is_graceful) {
                        tracing::debug!("Agent session interrupted: {}", self.command);
                        self.state = State::Closing;
                        continue;
                    }

                    let code = signal.map_or(CALLBACK_FAILURE_CODE, |s| s.code);
                    self.state = State::Closing;
                    return Err(ExecError::Aborted {
                        command: self.command.clone(),
                        code,
                        source,
                    });
                }
            }
        }

        Ok(())
    }

    /// Read one chunk, then keep reading while the pipe reports buffered
    /// bytes, so everything the child has flushed arrives together.
    ///
    /// A child that never pauses would keep the pipe non-empty forever, so a
    /// single drain stops at `MAX_DRAIN_CHUNKS * chunk_size` bytes and the
    /// rest arrives in the next iteration.
    fn drain(&mut self) -> Result<String> {
        let chunk_size = self.options.chunk_size.max(1);
        let limit = chunk_size.saturating_mul(MAX_DRAIN_CHUNKS);
        let mut bytes = std::mem::take(&mut self.pending);

        let Some(stdout) = self.pipes.stdout.as_mut() else {
            self.eof = true;
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        };

        let mut buf = vec![0u8; chunk_size];
        let mut want = chunk_size;
        loop {
            let n = match stdout.read(&mut buf[..want]) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(ExecError::Io {
                        command: self.command.clone(),
                        source,
                    })
                }
            };

            if n == 0 {
                self.eof = true;
                break;
            }
            bytes.extend_from_slice(&buf[..n]);

            let available = pipe::buffered_bytes(stdout);
            if available == 0 || bytes.len() >= limit {
                break;
            }
            want = available.min(chunk_size).min(limit - bytes.len());
        }

        if !self.eof {
            let keep = incomplete_tail(&bytes);
            self.pending = bytes.split_off(bytes.len() - keep);
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn send(&mut self, input: &str) -> Result<()> {
        let Some(stdin) = self.pipes.stdin.as_mut() else {
            tracing::debug!("Dropping input for closed stdin: {}", self.command);
            return Ok(());
        };

        let written = stdin.write_all(input.as_bytes()).and_then(|()| stdin.flush());
        match written {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::BrokenPipe => {
                // The child is gone; the next read reports end-of-stream.
                tracing::debug!("Child closed stdin: {}", self.command);
                self.pipes.stdin = None;
                Ok(())
            }
            Err(source) => Err(ExecError::Io {
                command: self.command.clone(),
                source,
            }),
        }
    }

    fn idle(&self) {
        if self.eof {
            return;
        }
        if let Some(stdout) = self.pipes.stdout.as_ref() {
            pipe::wait_readable(stdout, self.options.backoff);
        }
    }

    /// Close all pipes and reap the child. Runs once; later calls return the
    /// same exit status.
    fn finish(&mut self) -> Result<i32> {
        if self.state == State::Terminated {
            return Ok(self
                .exit_code
                .unwrap_or(crate::error::LAUNCH_FAILURE_CODE));
        }

        self.state = State::Closing;
        self.pipes.close();
        debug_assert!(self.pipes.is_closed());

        let Some(mut child) = self.child.take() else {
            self.state = State::Terminated;
            return Ok(crate::error::LAUNCH_FAILURE_CODE);
        };

        let status = child.wait();
        self.state = State::Terminated;

        let status = status.map_err(|source| ExecError::Io {
            command: self.command.clone(),
            source,
        })?;
        let code = launcher::exit_code(status);
        self.exit_code = Some(code);
        tracing::debug!("Agent command exited with code {}: {}", code, self.command);
        Ok(code)
    }
}

impl Drop for AgentSession {
    fn drop(&mut self) {
        if self.state != State::Terminated {
            if let Err(err) = self.finish() {
                tracing::warn!("Failed to reap agent child: {}", err);
            }
        }
    }
}

/// Length of an incomplete UTF-8 sequence at the end of `bytes`.
fn incomplete_tail(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let byte = bytes[bytes.len() - back];
        if byte & 0b1100_0000 == 0b1000_0000 {
            continue;
        }
        let width = match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        };
        return if width > back { back } else { 0 };
    }
    0
}
