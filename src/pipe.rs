//! OS-level queries on pipe handles.
//!
//! On Unix these use `ioctl(FIONREAD)` and `poll(2)`. Elsewhere the agent
//! falls back to single reads and a plain sleep.

use std::time::Duration;

#[cfg(unix)]
use std::os::unix::io::AsRawFd;

/// Bytes already buffered in the pipe and not yet read.
#[cfg(unix)]
pub fn buffered_bytes<T: AsRawFd>(stream: &T) -> usize {
    let mut available: libc::c_int = 0;
    // SAFETY: FIONREAD stores a single c_int through the pointer, and the
    // descriptor stays open for the duration of the call.
    let rc = unsafe {
        libc::ioctl(
            stream.as_raw_fd(),
            libc::FIONREAD,
            &mut available as *mut libc::c_int,
        )
    };
    if rc < 0 {
        0
    } else {
        usize::try_from(available).unwrap_or(0)
    }
}

#[cfg(not(unix))]
pub fn buffered_bytes<T>(_stream: &T) -> usize {
    0
}

/// Block until `stream` is readable or `timeout` elapses.
///
/// Returns true when the stream became readable (data or hang-up).
#[cfg(unix)]
pub fn wait_readable<T: AsRawFd>(stream: &T, timeout: Duration) -> bool {
    let mut fds = libc::pollfd {
        fd: stream.as_raw_fd(),
        events: libc::POLLIN,
        revents: 0,
    };
    let millis = timeout.as_micros().div_ceil(1000);
    let millis = libc::c_int::try_from(millis).unwrap_or(libc::c_int::MAX);
    // SAFETY: `fds` is a single valid pollfd living on the stack.
    let rc = unsafe { libc::poll(&mut fds, 1, millis) };
    rc > 0
}

#[cfg(not(unix))]
pub fn wait_readable<T>(_stream: &T, timeout: Duration) -> bool {
    std::thread::sleep(timeout);
    false
}
