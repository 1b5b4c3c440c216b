//! View: scroll state and frame composition.
//!
//! A `View` holds the screen geometry and the scroll offsets. It doesn't
//! own the buffer or the cursor; those are passed in. Each frame is built
//! by [`View::render_frame`] into one [`OutputBuffer`], which the caller
//! flushes with a single write.
//!
//! ```text
//! ┌───────────────────────────────┐
//! │ int main(void) {              │ ← text rows (screen_rows)
//! │ ~                             │
//! ├───────────────────────────────┤
//! │ main.c - 3 lines     c | 1/3  │ ← status bar, inverse
//! │ HELP: Ctrl-S = save           │ ← message bar
//! └───────────────────────────────┘
//! ```

use std::io;

use kilo_term::ansi::{self, Color};
use kilo_term::output::OutputBuffer;

use crate::buffer::Buffer;
use crate::cursor::Cursor;
use crate::highlight::Highlight;

/// Shown on the vertical third of an empty buffer.
pub const WELCOME: &str = concat!("Kilo editor -- version ", env!("CARGO_PKG_VERSION"));

/// Longest file name prefix shown in the status bar.
const STATUS_NAME_MAX: usize = 20;

/// Scroll offsets and text-area geometry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct View {
    /// First visible row.
    pub row_off: usize,
    /// First visible render column.
    pub col_off: usize,
    /// Render column of the cursor, refreshed by [`scroll`](Self::scroll).
    pub rx: usize,
    /// Rows available for text (the two bar rows excluded).
    pub screen_rows: usize,
    pub screen_cols: usize,
}

impl View {
    /// A view over a text area of `screen_rows` by `screen_cols` cells.
    #[must_use]
    pub const fn new(screen_rows: usize, screen_cols: usize) -> Self {
        Self {
            row_off: 0,
            col_off: 0,
            rx: 0,
            screen_rows,
            screen_cols,
        }
    }

    // -- Scrolling ----------------------------------------------------------

    /// Recompute the cursor's render column and move the offsets just enough
    /// to keep the cursor on screen.
    pub fn scroll(&mut self, cursor: Cursor, buf: &Buffer) {
        self.rx = buf
            .row(cursor.cy)
            .map_or(0, |row| row.cx_to_rx(cursor.cx, buf.tab_stop()));

        if self.screen_rows == 0 || self.screen_cols == 0 {
            return;
        }

        if cursor.cy < self.row_off {
            self.row_off = cursor.cy;
        }
        if cursor.cy >= self.row_off + self.screen_rows {
            self.row_off = cursor.cy + 1 - self.screen_rows;
        }
        if self.rx < self.col_off {
            self.col_off = self.rx;
        }
        if self.rx >= self.col_off + self.screen_cols {
            self.col_off = self.rx + 1 - self.screen_cols;
        }
    }

    // -- Rendering ----------------------------------------------------------

    /// Compose a full frame: text rows, status bar, message bar, then the
    /// cursor placement. Call [`scroll`](Self::scroll) first.
    ///
    /// # Errors
    ///
    /// Only fails if the output buffer does, which a `Vec`-backed buffer
    /// never does.
    pub fn render_frame(
        &self,
        out: &mut OutputBuffer,
        buf: &Buffer,
        cursor: Cursor,
        message: Option<&str>,
    ) -> io::Result<()> {
        ansi::cursor_hide(out)?;
        ansi::cursor_home(out)?;

        self.draw_rows(out, buf)?;
        self.draw_status_bar(out, buf, cursor)?;
        self.draw_message_bar(out, message)?;

        ansi::cursor_to(
            out,
            self.rx.saturating_sub(self.col_off),
            cursor.cy.saturating_sub(self.row_off),
        )?;
        ansi::cursor_show(out)
    }

    fn draw_rows(&self, out: &mut OutputBuffer, buf: &Buffer) -> io::Result<()> {
        for y in 0..self.screen_rows {
            let file_row = y + self.row_off;
            match buf.row(file_row) {
                Some(row) => {
                    let render = row.render();
                    let start = self.col_off.min(render.len());
                    let end = (self.col_off + self.screen_cols).min(render.len());
                    draw_highlighted(out, &render[start..end], &row.hl()[start..end])?;
                }
                None if buf.is_empty() && y == self.screen_rows / 3 => {
                    self.draw_welcome(out);
                }
                None => out.push(b'~'),
            }
            ansi::clear_line_right(out)?;
            out.push_bytes(b"\r\n");
        }
        Ok(())
    }

    fn draw_welcome(&self, out: &mut OutputBuffer) {
        let len = WELCOME.len().min(self.screen_cols);
        let mut padding = (self.screen_cols - len) / 2;
        if padding > 0 {
            out.push(b'~');
            padding -= 1;
        }
        out.push_repeat(b' ', padding);
        out.push_bytes(&WELCOME.as_bytes()[..len]);
    }

    fn draw_status_bar(&self, out: &mut OutputBuffer, buf: &Buffer, cursor: Cursor) -> io::Result<()> {
        ansi::inverse(out)?;

        let name: String = buf.filename().map_or_else(
            || "[No Name]".to_string(),
            |p| p.display().to_string().chars().take(STATUS_NAME_MAX).collect(),
        );
        let modified = if buf.is_dirty() { " (modified)" } else { "" };
        let left = format!("{name} - {} lines{modified}", buf.len());
        let filetype = buf.syntax().map_or("no ft", |s| s.filetype);
        let right = format!("{filetype} | {}/{}", cursor.cy + 1, buf.len());

        let mut len = left.len().min(self.screen_cols);
        out.push_bytes(&left.as_bytes()[..len]);
        while len < self.screen_cols {
            if self.screen_cols - len == right.len() {
                out.push_bytes(right.as_bytes());
                break;
            }
            out.push(b' ');
            len += 1;
        }

        ansi::reset(out)?;
        out.push_bytes(b"\r\n");
        Ok(())
    }

    fn draw_message_bar(&self, out: &mut OutputBuffer, message: Option<&str>) -> io::Result<()> {
        ansi::clear_line_right(out)?;
        if let Some(msg) = message {
            let len = msg.len().min(self.screen_cols);
            out.push_bytes(&msg.as_bytes()[..len]);
        }
        Ok(())
    }
}

/// Emit `render` with a color change only where the highlight class changes.
/// Control bytes are drawn inverse as `@`-letters (or `?`).
fn draw_highlighted(out: &mut OutputBuffer, render: &[u8], hl: &[Highlight]) -> io::Result<()> {
    let mut current: Option<Color> = None;

    for (&c, &h) in render.iter().zip(hl) {
        if c.is_ascii_control() {
            let sym = if c <= 26 { b'@' + c } else { b'?' };
            ansi::inverse(out)?;
            out.push(sym);
            ansi::reset(out)?;
            if let Some(color) = current {
                ansi::fg(out, color)?;
            }
        } else if h == Highlight::Normal {
            if current.is_some() {
                ansi::fg(out, Color::Default)?;
                current = None;
            }
            out.push(c);
        } else {
            let color = h.color();
            if current != Some(color) {
                ansi::fg(out, color)?;
                current = Some(color);
            }
            out.push(c);
        }
    }
    ansi::fg(out, Color::Default)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::C;
    use pretty_assertions::assert_eq;

    fn frame(view: &View, buf: &Buffer, cursor: Cursor, msg: Option<&str>) -> String {
        let mut out = OutputBuffer::new();
        view.render_frame(&mut out, buf, cursor, msg).unwrap();
        String::from_utf8(out.into_bytes()).unwrap()
    }

    // -- Scrolling ----------------------------------------------------------

    #[test]
    fn scroll_cursor_already_visible() {
        let buf = Buffer::from_lines(4, ["a"; 20]);
        let mut view = View::new(10, 80);
        view.scroll(Cursor::at(0, 5), &buf);
        assert_eq!((view.row_off, view.col_off), (0, 0));
    }

    #[test]
    fn scroll_down_when_cursor_below() {
        let buf = Buffer::from_lines(4, ["a"; 20]);
        let mut view = View::new(10, 80);
        view.scroll(Cursor::at(0, 15), &buf);
        assert_eq!(view.row_off, 6);
    }

    #[test]
    fn scroll_up_when_cursor_above() {
        let buf = Buffer::from_lines(4, ["a"; 20]);
        let mut view = View::new(10, 80);
        view.row_off = 12;
        view.scroll(Cursor::at(0, 3), &buf);
        assert_eq!(view.row_off, 3);
    }

    #[test]
    fn scroll_uses_render_column() {
        let buf = Buffer::from_lines(4, ["\t\t\tx"]);
        let mut view = View::new(10, 8);
        view.scroll(Cursor::at(3, 0), &buf);
        assert_eq!(view.rx, 12);
        assert_eq!(view.col_off, 5);

        view.scroll(Cursor::at(1, 0), &buf);
        assert_eq!(view.rx, 4);
        assert_eq!(view.col_off, 4);
    }

    #[test]
    fn scroll_on_virtual_line() {
        let buf = Buffer::from_lines(4, ["abc"]);
        let mut view = View::new(10, 80);
        view.scroll(Cursor::at(0, 1), &buf);
        assert_eq!(view.rx, 0);
    }

    #[test]
    fn scroll_noop_zero_size() {
        let buf = Buffer::from_lines(4, ["abc"]);
        let mut view = View::new(0, 0);
        view.scroll(Cursor::at(2, 0), &buf);
        assert_eq!((view.row_off, view.col_off), (0, 0));
    }

    #[test]
    fn find_style_scroll_puts_row_on_top() {
        let buf = Buffer::from_lines(4, ["a"; 30]);
        let mut view = View::new(10, 80);
        view.row_off = buf.len();
        view.scroll(Cursor::at(0, 17), &buf);
        assert_eq!(view.row_off, 17);
    }

    // -- Frames -------------------------------------------------------------

    #[test]
    fn frame_structure() {
        let buf = Buffer::from_lines(4, ["hi"]);
        let mut view = View::new(3, 20);
        view.scroll(Cursor::at(1, 0), &buf);
        let f = frame(&view, &buf, Cursor::at(1, 0), Some("msg"));

        assert!(f.starts_with("\x1b[?25l\x1b[H"));
        assert!(f.ends_with("\x1b[1;2H\x1b[?25h"));
        assert!(f.contains("hi\x1b[39m\x1b[K\r\n"));
        assert!(f.contains("~\x1b[K\r\n"));
        assert!(f.contains("\x1b[Kmsg"));
    }

    #[test]
    fn welcome_banner_on_empty_buffer() {
        let buf = Buffer::default();
        let view = View::new(9, 80);
        let f = frame(&view, &buf, Cursor::new(), None);
        let rows: Vec<&str> = f.split("\r\n").collect();
        assert!(rows[3].contains(WELCOME), "{:?}", rows[3]);
        assert!(rows[3].starts_with('~'));
        assert!(!rows[2].contains("Kilo"));
    }

    #[test]
    fn welcome_banner_is_truncated() {
        let buf = Buffer::default();
        let view = View::new(3, 10);
        let f = frame(&view, &buf, Cursor::new(), None);
        assert!(f.contains("Kilo edito\x1b[K"));
    }

    #[test]
    fn no_banner_when_buffer_has_rows() {
        let buf = Buffer::from_lines(4, [""]);
        let view = View::new(9, 80);
        let f = frame(&view, &buf, Cursor::new(), None);
        assert!(!f.contains("Kilo editor"));
    }

    #[test]
    fn rows_are_clipped_to_offsets() {
        let buf = Buffer::from_lines(4, ["0123456789"]);
        let mut view = View::new(1, 4);
        view.col_off = 3;
        let f = frame(&view, &buf, Cursor::at(3, 0), None);
        assert!(f.contains("\x1b[H3456\x1b[39m"), "{f:?}");
    }

    #[test]
    fn color_runs_switch_only_on_class_change() {
        let mut buf = Buffer::from_lines(4, ["int 12;"]);
        buf.set_syntax(Some(&C));
        let view = View::new(1, 80);
        let f = frame(&view, &buf, Cursor::new(), None);
        assert!(
            f.contains("\x1b[32mint\x1b[39m \x1b[31m12\x1b[39m;\x1b[39m"),
            "{f:?}"
        );
    }

    #[test]
    fn control_bytes_render_inverse() {
        let buf = Buffer::from_lines(4, [b"a\x01b".as_slice()]);
        let view = View::new(1, 80);
        let f = frame(&view, &buf, Cursor::new(), None);
        assert!(f.contains("a\x1b[7mA\x1b[mb"), "{f:?}");
    }

    #[test]
    fn status_bar_layout() {
        let mut buf = Buffer::from_lines(4, ["x", "y"]);
        buf.set_filename("main.c");
        buf.insert_char(0, 0, b'z');
        let view = View::new(2, 40);
        let f = frame(&view, &buf, Cursor::at(0, 1), None);

        let left = "main.c - 2 lines (modified)";
        let right = "c | 2/2";
        let pad = " ".repeat(40 - left.len() - right.len());
        assert!(f.contains(&format!("\x1b[7m{left}{pad}{right}\x1b[m\r\n")), "{f:?}");
    }

    #[test]
    fn status_bar_without_name_or_syntax() {
        let buf = Buffer::from_lines(4, ["x"]);
        let view = View::new(1, 80);
        let f = frame(&view, &buf, Cursor::new(), None);
        assert!(f.contains("[No Name] - 1 lines"));
        assert!(f.contains("no ft | 1/1\x1b[m"));
    }

    #[test]
    fn long_file_names_are_cut() {
        let mut buf = Buffer::from_lines(4, ["x"]);
        buf.set_filename("abcdefghijklmnopqrstuvwxyz.txt");
        let view = View::new(1, 80);
        let f = frame(&view, &buf, Cursor::new(), None);
        assert!(f.contains("abcdefghijklmnopqrst - 1 lines"));
    }

    #[test]
    fn message_is_clipped_to_width() {
        let buf = Buffer::from_lines(4, ["x"]);
        let view = View::new(1, 5);
        let f = frame(&view, &buf, Cursor::new(), Some("hello world"));
        assert!(f.contains("\x1b[Khello\x1b[1;1H"), "{f:?}");
    }

    #[test]
    fn frame_is_one_buffer() {
        let buf = Buffer::from_lines(4, ["a"; 50]);
        let view = View::new(24, 80);
        let mut out = OutputBuffer::new();
        view.render_frame(&mut out, &buf, Cursor::new(), None).unwrap();
        let mut sink: Vec<u8> = Vec::new();
        let len = out.len();
        out.flush_to(&mut sink).unwrap();
        assert_eq!(sink.len(), len);
    }
}
