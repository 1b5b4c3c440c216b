//! Cursor: a position in raw-byte coordinates with arrow-key movement.
//!
//! The cursor is a plain `(cx, cy)` pair: `cy` indexes rows, `cx` indexes
//! the raw bytes of that row. `cy` may equal the row count, which is the
//! virtual empty line past the end of the document where typing appends a
//! new row. The render column is derived from `cx` by the view when it
//! scrolls; the cursor never stores it.
//!
//! Like the buffer, the cursor does not own the document. Movement methods
//! take the [`Buffer`] as a parameter.

use kilo_term::input::Key;

use crate::buffer::Buffer;

/// The editing position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Raw byte column within the current row.
    pub cx: usize,
    /// Row index; may be one past the last row.
    pub cy: usize,
}

impl Cursor {
    /// The origin.
    #[must_use]
    pub const fn new() -> Self {
        Self { cx: 0, cy: 0 }
    }

    /// A cursor at column `cx` of row `cy`.
    #[must_use]
    pub const fn at(cx: usize, cy: usize) -> Self {
        Self { cx, cy }
    }

    /// Length of the current row, or 0 on the virtual line.
    fn row_len(self, buf: &Buffer) -> usize {
        buf.row(self.cy).map_or(0, |r| r.len())
    }

    /// Apply an arrow key.
    ///
    /// Left at column 0 wraps to the end of the previous row; Right at the
    /// end of a row wraps to the start of the next. Up and Down keep the
    /// column if they can and snap it back to the new row's length
    /// otherwise. Non-arrow keys are ignored.
    pub fn move_by(&mut self, key: Key, buf: &Buffer) {
        match key {
            Key::ArrowLeft => {
                if self.cx > 0 {
                    self.cx -= 1;
                } else if self.cy > 0 {
                    self.cy -= 1;
                    self.cx = self.row_len(buf);
                }
            }
            Key::ArrowRight => {
                if let Some(row) = buf.row(self.cy) {
                    if self.cx < row.len() {
                        self.cx += 1;
                    } else {
                        self.cy += 1;
                        self.cx = 0;
                    }
                }
            }
            Key::ArrowUp => self.cy = self.cy.saturating_sub(1),
            Key::ArrowDown => {
                if self.cy < buf.len() {
                    self.cy += 1;
                }
            }
            _ => return,
        }
        self.snap(buf);
    }

    /// Move to the start of the row.
    pub const fn home(&mut self) {
        self.cx = 0;
    }

    /// Move past the last byte of the row.
    pub fn end(&mut self, buf: &Buffer) {
        if self.cy < buf.len() {
            self.cx = self.row_len(buf);
        }
    }

    /// Clamp `cx` to the current row.
    pub fn snap(&mut self, buf: &Buffer) {
        self.cx = self.cx.min(self.row_len(buf));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buf() -> Buffer {
        Buffer::from_lines(4, ["hello", "hi", "", "world!"])
    }

    #[test]
    fn left_wraps_to_previous_row_end() {
        let b = buf();
        let mut c = Cursor::at(0, 1);
        c.move_by(Key::ArrowLeft, &b);
        assert_eq!(c, Cursor::at(5, 0));
    }

    #[test]
    fn left_at_origin_stays() {
        let b = buf();
        let mut c = Cursor::new();
        c.move_by(Key::ArrowLeft, &b);
        assert_eq!(c, Cursor::new());
    }

    #[test]
    fn right_wraps_to_next_row_start() {
        let b = buf();
        let mut c = Cursor::at(2, 1);
        c.move_by(Key::ArrowRight, &b);
        assert_eq!(c, Cursor::at(0, 2));
    }

    #[test]
    fn right_on_virtual_line_stays() {
        let b = buf();
        let mut c = Cursor::at(0, 4);
        c.move_by(Key::ArrowRight, &b);
        assert_eq!(c, Cursor::at(0, 4));
    }

    #[test]
    fn vertical_moves_snap_column() {
        let b = buf();
        let mut c = Cursor::at(4, 0);
        c.move_by(Key::ArrowDown, &b);
        assert_eq!(c, Cursor::at(2, 1));
        c.move_by(Key::ArrowDown, &b);
        assert_eq!(c, Cursor::at(0, 2));
        // The column is not remembered across short rows.
        c.move_by(Key::ArrowDown, &b);
        assert_eq!(c, Cursor::at(0, 3));
    }

    #[test]
    fn down_reaches_virtual_line_only() {
        let b = buf();
        let mut c = Cursor::at(3, 3);
        c.move_by(Key::ArrowDown, &b);
        assert_eq!(c, Cursor::at(0, 4));
        c.move_by(Key::ArrowDown, &b);
        assert_eq!(c, Cursor::at(0, 4));
    }

    #[test]
    fn up_at_top_stays() {
        let b = buf();
        let mut c = Cursor::at(3, 0);
        c.move_by(Key::ArrowUp, &b);
        assert_eq!(c, Cursor::at(3, 0));
    }

    #[test]
    fn home_and_end() {
        let b = buf();
        let mut c = Cursor::at(2, 3);
        c.end(&b);
        assert_eq!(c.cx, 6);
        c.home();
        assert_eq!(c.cx, 0);

        let mut v = Cursor::at(0, 4);
        v.end(&b);
        assert_eq!(v.cx, 0);
    }

    #[test]
    fn other_keys_are_ignored() {
        let b = buf();
        let mut c = Cursor::at(9, 0);
        c.move_by(Key::Char(b'x'), &b);
        assert_eq!(c, Cursor::at(9, 0));
    }

    #[test]
    fn empty_buffer() {
        let b = Buffer::default();
        let mut c = Cursor::new();
        for key in [Key::ArrowRight, Key::ArrowDown, Key::ArrowLeft, Key::ArrowUp] {
            c.move_by(key, &b);
            assert_eq!(c, Cursor::new());
        }
    }
}
