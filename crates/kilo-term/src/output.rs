// SPDX-License-Identifier: MIT
//
// Output buffering.
//
// OutputBuffer accumulates all ANSI bytes of one frame in memory so the
// whole frame reaches the terminal in a single write() syscall. Writing
// piecemeal lets the terminal repaint mid-frame, which shows up as the
// cursor jumping around the screen and half-drawn rows.
//
// A buffer lives for exactly one frame: build it, flush it, drop it.

use std::io::{self, Write};

/// One frame's worth of escape sequences and text, written out in one go.
///
/// Starts at 16 KB, which holds a typical full-screen frame.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// An empty frame buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Everything pushed so far.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append raw bytes.
    #[inline]
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append one byte.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Append `n` copies of `byte`.
    pub fn push_repeat(&mut self, byte: u8, n: usize) {
        self.buf.resize(self.buf.len() + n, byte);
    }

    /// Consume the buffer, returning the accumulated bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Hand the frame to `w` with a single `write_all`, then empty the buffer.
    /// An empty buffer writes nothing.
    ///
    /// # Errors
    ///
    /// Fails when `w` does.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // The frame only leaves through flush_to.
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansi;

    /// A writer that counts how many times it was written to.
    #[derive(Default)]
    struct CountingWriter {
        bytes: Vec<u8>,
        writes: usize,
    }

    impl Write for CountingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes += 1;
            self.bytes.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn new_buffer_is_empty() {
        let buf = OutputBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn push_helpers() {
        let mut buf = OutputBuffer::new();
        buf.push(b'~');
        buf.push_repeat(b' ', 3);
        buf.push_bytes(b"hi");
        assert_eq!(buf.as_bytes(), b"~   hi");
    }

    #[test]
    fn ansi_writes_accumulate() {
        let mut buf = OutputBuffer::new();
        ansi::cursor_hide(&mut buf).unwrap();
        ansi::cursor_home(&mut buf).unwrap();
        assert_eq!(buf.as_bytes(), b"\x1b[?25l\x1b[H");
    }

    #[test]
    fn flush_is_a_single_write() {
        let mut buf = OutputBuffer::new();
        for _ in 0..100 {
            buf.push_bytes(b"row\r\n");
        }
        let mut w = CountingWriter::default();
        buf.flush_to(&mut w).unwrap();
        assert_eq!(w.writes, 1);
        assert_eq!(w.bytes.len(), 500);
        assert!(buf.is_empty());
    }

    #[test]
    fn flush_empty_writes_nothing() {
        let mut buf = OutputBuffer::new();
        let mut w = CountingWriter::default();
        buf.flush_to(&mut w).unwrap();
        assert_eq!(w.writes, 0);
    }

    #[test]
    fn into_bytes_returns_contents() {
        let mut buf = OutputBuffer::default();
        buf.push_bytes(b"frame");
        assert_eq!(buf.into_bytes(), b"frame".to_vec());
    }
}
