// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Stdin byte source with a read timeout.
//
// The editor loop blocks on input, but never forever: every read waits at
// most READ_TIMEOUT_MS, then reports "nothing yet" so the loop can redraw
// (the status message has to disappear on its own, keystroke or not).
//
// We poll() stdin's file descriptor with the timeout and only read() once
// it's readable, one byte at a time. The decoder pulls the bytes of an
// escape sequence through the same path, so a truncated sequence simply
// times out into a plain Escape.
//
// EINTR and EAGAIN count as timeouts. Anything else, and end-of-file on a
// readable descriptor, is a real failure: the terminal is gone.

use std::io;

use crate::input::ByteSource;

/// How long a single read waits for input (milliseconds).
pub const READ_TIMEOUT_MS: i32 = 100;

/// Timed, unbuffered reader over the process's stdin.
///
/// # Example
///
/// ```no_run
/// use kilo_term::input::read_key;
/// use kilo_term::reader::StdinSource;
///
/// let mut src = StdinSource::new();
/// if let Some(key) = read_key(&mut src)? {
///     println!("{key:?}");
/// }
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct StdinSource {
    timeout_ms: i32,
}

impl StdinSource {
    /// A source using [`READ_TIMEOUT_MS`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout_ms: READ_TIMEOUT_MS,
        }
    }

    /// A source with a custom timeout (milliseconds, clamped to >= 0).
    #[must_use]
    pub const fn with_timeout(timeout_ms: i32) -> Self {
        Self {
            timeout_ms: if timeout_ms < 0 { 0 } else { timeout_ms },
        }
    }

    /// The configured timeout in milliseconds.
    #[inline]
    #[must_use]
    pub const fn timeout_ms(&self) -> i32 {
        self.timeout_ms
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether an OS error just means "try again later".
fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
    )
}

#[cfg(unix)]
impl ByteSource for StdinSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let fd = libc::STDIN_FILENO;

        // Poll stdin for readability with a timeout.
        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&raw mut pfd, 1, self.timeout_ms)
        };

        if ready < 0 {
            let err = io::Error::last_os_error();
            return if is_transient(&err) { Ok(None) } else { Err(err) };
        }
        if ready == 0 {
            return Ok(None);
        }

        let mut byte = 0u8;
        let n = unsafe { libc::read(fd, (&raw mut byte).cast(), 1) };

        match n {
            1 => Ok(Some(byte)),
            0 => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stdin reached end of file",
            )),
            _ => {
                let err = io::Error::last_os_error();
                if is_transient(&err) { Ok(None) } else { Err(err) }
            }
        }
    }
}

/// Non-unix fallback: a plain blocking read, no timeout.
#[cfg(not(unix))]
impl ByteSource for StdinSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        use std::io::Read;

        let mut byte = [0u8; 1];
        match io::stdin().lock().read(&mut byte) {
            Ok(0) => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stdin reached end of file",
            )),
            Ok(_) => Ok(Some(byte[0])),
            Err(err) if is_transient(&err) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
