// SPDX-License-Identifier: MIT
//
// Terminal control: raw mode, window size, and RAII cleanup.
//
// Safety: termios (tcgetattr, tcsetattr), ioctl (TIOCGWINSZ), isatty and
// the raw fd write in the panic hook are all libc calls. Each unsafe block
// wraps exactly one of them.
#![allow(unsafe_code)]
//
// This module owns the terminal's raw state. `RawMode` switches the tty
// into raw mode on creation and puts the original settings back when it
// is dropped, so every exit path out of the editor (normal quit, an I/O
// error bubbling up through `?`, a panic) leaves the user's shell usable.
//
// The panic hook bypasses Rust's stdout lock and writes a pre-built
// restore sequence straight to fd 1, then reapplies the saved termios from
// a global backup. The hook can't reach the `RawMode` value, hence the
// backup.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;
use crate::input::{ByteSource, parse_cursor_report};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Window size, counted in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Width.
    pub cols: u16,
    /// Height, including the two bar rows.
    pub rows: u16,
}

/// Longest cursor position report we accept, `ESC [ rows ; cols` included.
const MAX_REPORT_LEN: usize = 31;

// ─── Queries ────────────────────────────────────────────────────────────────

/// Ask the kernel for the window size with `TIOCGWINSZ`. `None` when the
/// ioctl fails or reports a zero dimension.
///
/// Returns `None` if stdout is not a terminal, the query fails, or the
/// terminal reports zero columns.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Determine the window size, falling back to a cursor position report.
///
/// Tries `ioctl` first. When that is unavailable, the cursor is pushed to
/// the bottom-right corner and the terminal is asked where it ended up.
///
/// # Errors
///
/// Returns an error if writing the probe or reading the reply fails, or if
/// the reply is not a valid cursor position report.
pub fn window_size<S>(src: &mut S, out: &mut impl Write) -> io::Result<Size>
where
    S: ByteSource + ?Sized,
{
    if let Some(size) = get_size() {
        return Ok(size);
    }
    tracing::debug!("TIOCGWINSZ unavailable, probing with a cursor position report");
    probe_size(src, out)
}

/// Learn the window size from the terminal's cursor position report.
fn probe_size<S>(src: &mut S, out: &mut impl Write) -> io::Result<Size>
where
    S: ByteSource + ?Sized,
{
    ansi::cursor_to_bottom_right(out)?;
    ansi::request_cursor_position(out)?;
    out.flush()?;

    let mut reply = Vec::with_capacity(MAX_REPORT_LEN);
    while reply.len() < MAX_REPORT_LEN {
        match src.read_byte()? {
            Some(b'R') | None => break,
            Some(b) => reply.push(b),
        }
    }

    parse_cursor_report(&reply)
        .map(|(rows, cols)| Size { cols, rows })
        .ok_or_else(|| {
            tracing::warn!(reply = ?String::from_utf8_lossy(&reply), "bad cursor position report");
            io::Error::other("could not determine the window size")
        })
}

/// Whether stdin is a tty.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Screen Restore ─────────────────────────────────────────────────────────

/// Clear the screen and home the cursor, straight to stdout.
///
/// Used on every exit path so the editor's last frame doesn't linger
/// above the shell prompt.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn clear_and_home() -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    ansi::clear_screen(&mut stdout)?;
    ansi::cursor_home(&mut stdout)?;
    stdout.flush()
}

// ─── Restore On Panic ───────────────────────────────────────────────────────

/// Cooked-mode attributes, kept where the panic hook can reach them.
///
/// [`RawMode`] keeps its own copy, which the panic hook can't reach. The
/// hook reads this one instead.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Put the saved attributes back. Errors are ignored.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original);
            }
        }
    }
}

/// Complete restore sequence for emergency use: reset SGR attributes,
/// show the cursor, clear the screen, home the cursor.
#[rustfmt::skip]
const EMERGENCY_RESTORE: &[u8] = b"\
    \x1b[m\
    \x1b[?25h\
    \x1b[2J\
    \x1b[H";

/// Installs the panic hook at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Chain a panic hook that resets the tty ahead of the default report.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write the restore sequence with a raw `write(2)` on fd 1. The panic may
/// have fired while `io::stdout()` was locked for a frame flush.
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── RawMode ────────────────────────────────────────────────────────────────

/// Raw-mode guard with RAII cleanup.
///
/// Created once at startup. While it lives, the tty delivers bytes as they
/// are typed (no line buffering, no echo, no signal keys, no CR/NL
/// translation). Dropping it reapplies the original settings.
///
/// When stdin is not a terminal (tests, pipes) the guard is inert.
///
/// # Example
///
/// ```no_run
/// use kilo_term::terminal::RawMode;
///
/// let raw = RawMode::enable()?;
/// // ... render frames, handle input ...
/// drop(raw); // cooked mode is back
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct RawMode {
    /// Attributes in effect before raw mode.
    #[cfg(unix)]
    original: Option<libc::termios>,
}

impl RawMode {
    /// Switch stdin to raw mode.
    ///
    /// # Errors
    ///
    /// Returns an error if `tcgetattr` or `tcsetattr` fails.
    pub fn enable() -> io::Result<Self> {
        install_panic_hook();

        let mut guard = Self {
            #[cfg(unix)]
            original: None,
        };
        guard.enable_raw_mode()?;
        Ok(guard)
    }

    /// Whether raw mode is actually in effect (false when stdin isn't a tty).
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        #[cfg(unix)]
        {
            self.original.is_some()
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// Reapply the original terminal settings. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if `tcsetattr` fails.
    pub fn disable(&mut self) -> io::Result<()> {
        self.disable_raw_mode()
    }

    // ── Raw Mode (termios) ──────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        if !is_tty() {
            return Ok(());
        }

        let fd = libc::STDIN_FILENO;

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            // Keep the cooked attributes for Drop.
            self.original = Some(termios);

            // And for the panic hook.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            termios.c_iflag &=
                !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
            termios.c_oflag &= !libc::OPOST;
            termios.c_cflag |= libc::CS8;
            termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

            // VMIN=0, VTIME=1: read() returns after at most 100ms. The
            // reader polls first, so this only bounds a racing read.
            termios.c_cc[libc::VMIN] = 0;
            termios.c_cc[libc::VTIME] = 1;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if let Some(ref original) = self.original {
            unsafe {
                if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original) != 0 {
                    return Err(io::Error::last_os_error());
                }
            }

            // Restored; the panic hook has nothing left to do.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }

            self.original = None;
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(err) = self.disable_raw_mode() {
            tracing::warn!(%err, "failed to restore terminal settings");
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
