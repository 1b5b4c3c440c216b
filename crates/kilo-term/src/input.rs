// SPDX-License-Identifier: MIT
//
// Terminal input decoder.
//
// Turns raw stdin bytes into logical keys. The terminal is in raw mode, so
// every keypress arrives as one or more bytes: printable characters and
// control codes as a single byte, navigation keys as escape sequences.
//
// - CSI sequences: `ESC [ A` (arrows), `ESC [ H` / `ESC [ F` (Home/End)
// - CSI tilde sequences: `ESC [ 1 ~` … `ESC [ 8 ~` (Home, Delete, End,
//   PageUp, PageDown)
// - SS3 sequences: `ESC O H` / `ESC O F` (Home/End on some terminals)
//
// # Design
//
// One call decodes one key. When an ESC byte arrives we try to read the
// rest of the sequence right away, inside the same read cycle. If the
// follow-up bytes don't come before the source's timeout, or they don't
// form a sequence we know, the whole thing is reported as a plain Escape.
// Nothing is buffered across calls: a half-received sequence is dropped,
// never replayed as stray characters on the next call.

use std::collections::VecDeque;
use std::io;

/// The escape byte (0x1B) that opens every terminal key sequence.
pub const ESC: u8 = 0x1b;

/// The byte terminals send for the Backspace key in raw mode.
const DEL: u8 = 0x7f;

// ─── Key ────────────────────────────────────────────────────────────────────

/// A decoded keypress.
///
/// Literal bytes (printable characters, Enter, Tab, Ctrl combinations) are
/// reported as [`Char`](Key::Char). Escape sequences for navigation and
/// editing keys decode to their own variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A literal byte from the input stream.
    Char(u8),
    // ── Navigation ──────────────────────────────────────────────
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    // ── Editing ─────────────────────────────────────────────────
    Delete,
    Backspace,
    Escape,
}

impl Key {
    /// Enter arrives as carriage return in raw mode (ICRNL is off).
    pub const ENTER: Self = Self::Char(b'\r');

    /// The key produced by holding Ctrl and pressing `c`.
    ///
    /// Ctrl strips bits 5 and 6, so `ctrl(b'q')` is byte 0x11.
    #[inline]
    #[must_use]
    pub const fn ctrl(c: u8) -> Self {
        Self::Char(c & 0x1f)
    }

    /// Whether this key is a printable ASCII character (no control bytes).
    #[inline]
    #[must_use]
    pub const fn is_printable(self) -> bool {
        matches!(self, Self::Char(c) if c >= 0x20 && c < 0x7f)
    }
}

// ─── Byte Source ────────────────────────────────────────────────────────────

/// A blocking-with-timeout source of input bytes.
///
/// `Ok(None)` means the read timed out with nothing available. That's not
/// an error: the editor uses it to re-render periodically while idle.
pub trait ByteSource {
    /// Read the next byte, waiting at most the source's timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream cannot be read.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }
}

/// An in-memory script of bytes. Running dry behaves like a timeout.
impl ByteSource for VecDeque<u8> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.pop_front())
    }
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Read and decode one key.
///
/// Returns `Ok(None)` if the source timed out before the first byte.
///
/// # Errors
///
/// Propagates read errors from the source. Malformed or truncated escape
/// sequences are never errors; they decode to [`Key::Escape`].
pub fn read_key<S: ByteSource + ?Sized>(src: &mut S) -> io::Result<Option<Key>> {
    let Some(byte) = src.read_byte()? else {
        return Ok(None);
    };

    let key = match byte {
        ESC => parse_escape(src)?,
        DEL => Key::Backspace,
        b => Key::Char(b),
    };
    Ok(Some(key))
}

/// Decode the bytes after an ESC.
///
/// Exactly two bytes are attempted. If either is missing the key is a
/// plain Escape and whatever was read is discarded.
fn parse_escape<S: ByteSource + ?Sized>(src: &mut S) -> io::Result<Key> {
    let Some(first) = src.read_byte()? else {
        return Ok(Key::Escape);
    };
    let Some(second) = src.read_byte()? else {
        return Ok(Key::Escape);
    };

    match first {
        // CSI: ESC [
        b'[' => parse_csi(src, second),
        // SS3: ESC O
        b'O' => Ok(parse_ss3(second)),
        _ => Ok(Key::Escape),
    }
}

// ── CSI (Control Sequence Introducer) ───────────────────────────────────────

fn parse_csi<S: ByteSource + ?Sized>(src: &mut S, byte: u8) -> io::Result<Key> {
    if byte.is_ascii_digit() {
        // Tilde-terminated: ESC [ <digit> ~
        if src.read_byte()? != Some(b'~') {
            return Ok(Key::Escape);
        }
        return Ok(match byte {
            b'1' | b'7' => Key::Home,
            b'4' | b'8' => Key::End,
            b'3' => Key::Delete,
            b'5' => Key::PageUp,
            b'6' => Key::PageDown,
            _ => Key::Escape,
        });
    }

    Ok(match byte {
        b'A' => Key::ArrowUp,
        b'B' => Key::ArrowDown,
        b'C' => Key::ArrowRight,
        b'D' => Key::ArrowLeft,
        b'H' => Key::Home,
        b'F' => Key::End,
        _ => Key::Escape,
    })
}

// ── SS3 (Single Shift 3) ───────────────────────────────────────────────────

const fn parse_ss3(byte: u8) -> Key {
    match byte {
        b'H' => Key::Home,
        b'F' => Key::End,
        _ => Key::Escape,
    }
}

// ─── Cursor Position Report ─────────────────────────────────────────────────

/// Parse a cursor position report `ESC [ rows ; cols R` into `(rows, cols)`.
///
/// The trailing `R` is optional so the reply can be passed in with or
/// without its terminator. Returns `None` for anything else.
#[must_use]
pub fn parse_cursor_report(reply: &[u8]) -> Option<(u16, u16)> {
    let body = reply.strip_prefix(&[ESC, b'['])?;
    let body = body.strip_suffix(b"R").unwrap_or(body);

    let sep = body.iter().position(|&b| b == b';')?;
    let rows = parse_u16(&body[..sep])?;
    let cols = parse_u16(&body[sep + 1..])?;
    Some((rows, cols))
}

/// Parse a non-empty run of ASCII digits. Overflow or any other byte fails.
fn parse_u16(digits: &[u8]) -> Option<u16> {
    if digits.is_empty() {
        return None;
    }
    digits.iter().try_fold(0u16, |acc, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(u16::from(b - b'0'))
    })
}

// ─── Tests ──────────────────────────────────────────────────────────────────
