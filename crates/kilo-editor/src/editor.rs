//! The editor context and its main loop.
//!
//! [`Editor`] bundles everything one editing session needs: the row store,
//! the cursor, the view, the status message and the options. It is passed
//! by `&mut` to every operation; nothing lives in statics.
//!
//! Input and output are parameters too. The loop reads keys from any
//! [`ByteSource`] and writes frames to any `Write`, so whole sessions run in
//! tests against an in-memory byte script and a `Vec<u8>`.

use std::io::Write;
use std::path::Path;
use std::time::Instant;

use kilo_term::input::{ByteSource, Key, read_key};
use kilo_term::output::OutputBuffer;
use kilo_term::terminal::Size;
use tracing::{debug, warn};

use crate::buffer::Buffer;
use crate::cursor::Cursor;
use crate::error::Result;
use crate::options::Options;
use crate::search::FindState;
use crate::status::StatusMessage;
use crate::view::View;

/// Rows taken by the status bar and the message bar.
const BAR_ROWS: usize = 2;

/// Shown when the editor starts.
pub const HELP_MESSAGE: &str = "HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find";

const QUIT: Key = Key::ctrl(b'q');
const SAVE: Key = Key::ctrl(b's');
const FIND: Key = Key::ctrl(b'f');
const BACKSPACE_CTRL: Key = Key::ctrl(b'h');
const REFRESH: Key = Key::ctrl(b'l');

/// What the main loop should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// One editing session.
#[derive(Debug)]
pub struct Editor {
    buffer: Buffer,
    cursor: Cursor,
    view: View,
    status: StatusMessage,
    options: Options,
    quit_times: u8,
}

impl Editor {
    /// An editor for a terminal of `size`, with an empty buffer.
    #[must_use]
    pub fn new(size: Size, options: Options) -> Self {
        let rows = usize::from(size.rows).saturating_sub(BAR_ROWS);
        Self {
            buffer: Buffer::new(options.tab_stop),
            cursor: Cursor::new(),
            view: View::new(rows, usize::from(size.cols)),
            status: StatusMessage::new(options.message_timeout),
            quit_times: options.quit_times,
            options,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[must_use]
    pub const fn view(&self) -> &View {
        &self.view
    }

    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Current status message text, expired or not.
    #[must_use]
    pub fn status_message(&self) -> &str {
        self.status.text()
    }

    pub fn set_status_message(&mut self, text: impl Into<String>) {
        self.status.set(text);
    }

    /// Load `path` into the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but can't be read.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        self.buffer.open(path)?;
        self.cursor = Cursor::new();
        Ok(())
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `c` at the cursor. On the virtual line past the end, a new
    /// row is appended first.
    pub fn insert_char(&mut self, c: u8) {
        if self.cursor.cy == self.buffer.len() {
            self.buffer.insert_row(self.buffer.len(), b"");
        }
        self.buffer.insert_char(self.cursor.cy, self.cursor.cx, c);
        self.cursor.cx += 1;
    }

    /// Break the line at the cursor.
    pub fn insert_newline(&mut self) {
        let Cursor { cx, cy } = self.cursor;
        if cx == 0 {
            self.buffer.insert_row(cy, b"");
        } else {
            let tail = self.buffer.split_off(cy, cx);
            self.buffer.insert_row(cy + 1, &tail);
        }
        self.cursor = Cursor::at(0, cy + 1);
    }

    /// Delete the byte left of the cursor, joining with the previous row at
    /// column 0.
    pub fn delete_char(&mut self) {
        let Cursor { cx, cy } = self.cursor;
        if cy == self.buffer.len() || (cx == 0 && cy == 0) {
            return;
        }

        if cx > 0 {
            self.buffer.delete_char(cy, cx - 1);
            self.cursor.cx -= 1;
        } else {
            let prev_len = self.buffer.row(cy - 1).map_or(0, |r| r.len());
            let line = self.buffer.row(cy).map(|r| r.chars().to_vec()).unwrap_or_default();
            self.buffer.append_string(cy - 1, &line);
            self.buffer.delete_row(cy);
            self.cursor = Cursor::at(prev_len, cy - 1);
        }
    }

    /// Move the cursor for a navigation key.
    pub fn move_cursor(&mut self, key: Key) {
        match key {
            Key::Home => self.cursor.home(),
            Key::End => self.cursor.end(&self.buffer),
            Key::PageUp | Key::PageDown => {
                if key == Key::PageUp {
                    self.cursor.cy = self.view.row_off;
                } else {
                    let bottom = self.view.row_off + self.view.screen_rows.saturating_sub(1);
                    self.cursor.cy = bottom.min(self.buffer.len());
                }
                let step = if key == Key::PageUp {
                    Key::ArrowUp
                } else {
                    Key::ArrowDown
                };
                for _ in 0..self.view.screen_rows {
                    self.cursor.move_by(step, &self.buffer);
                }
            }
            _ => self.cursor.move_by(key, &self.buffer),
        }
    }

    // -- Screen -------------------------------------------------------------

    /// Scroll, compose one frame and write it to `out` in a single write.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn refresh_screen(&mut self, out: &mut impl Write) -> Result<()> {
        self.view.scroll(self.cursor, &self.buffer);

        let mut frame = OutputBuffer::new();
        let message = self.status.visible_at(Instant::now());
        self.view
            .render_frame(&mut frame, &self.buffer, self.cursor, message)?;
        frame.flush_to(out)?;
        Ok(())
    }

    /// Read a line in the message bar.
    ///
    /// `template` is shown with `{}` replaced by the input so far. Every
    /// keystroke, editing keys included, is passed to `callback` along with
    /// the input as it reads after that key. Returns the input on Enter
    /// (Enter on an empty input is ignored) or `None` on Escape.
    ///
    /// # Errors
    ///
    /// Returns an error if reading keys or writing frames fails.
    pub fn prompt<S, W, F>(
        &mut self,
        src: &mut S,
        out: &mut W,
        template: &str,
        mut callback: F,
    ) -> Result<Option<String>>
    where
        S: ByteSource + ?Sized,
        W: Write,
        F: FnMut(&mut Self, &str, Key),
    {
        let mut input = String::new();
        loop {
            self.set_status_message(template.replace("{}", &input));
            self.refresh_screen(out)?;

            let Some(key) = read_key(src)? else {
                continue;
            };
            match key {
                Key::Delete | Key::Backspace | BACKSPACE_CTRL => {
                    input.pop();
                }
                Key::Escape => {
                    self.set_status_message("");
                    callback(self, &input, key);
                    return Ok(None);
                }
                Key::ENTER if !input.is_empty() => {
                    self.set_status_message("");
                    callback(self, &input, key);
                    return Ok(Some(input));
                }
                Key::Char(c) if key.is_printable() => input.push(char::from(c)),
                _ => {}
            }
            callback(self, &input, key);
        }
    }

    /// Write the buffer to disk, asking for a name first if it has none.
    /// The outcome is reported in the status message.
    ///
    /// # Errors
    ///
    /// Only terminal failures while prompting are errors. A failed write
    /// is reported in the message bar and leaves the buffer dirty.
    pub fn save<S, W>(&mut self, src: &mut S, out: &mut W) -> Result<()>
    where
        S: ByteSource + ?Sized,
        W: Write,
    {
        if self.buffer.filename().is_none() {
            let Some(name) = self.prompt(src, out, "Save as: {} (ESC to cancel)", |_, _, _| {})?
            else {
                self.set_status_message("Save aborted");
                return Ok(());
            };
            self.buffer.set_filename(name);
        }

        match self.buffer.save() {
            Ok(n) => self.set_status_message(format!("{n} bytes written to disk")),
            Err(e) => {
                warn!(error = %e, "save failed");
                self.set_status_message(format!("Can't save! I/O error: {e}"));
            }
        }
        Ok(())
    }

    /// Incremental search. Escape puts the cursor and scroll back where
    /// they were.
    ///
    /// # Errors
    ///
    /// Returns an error if reading keys or writing frames fails.
    pub fn find<S, W>(&mut self, src: &mut S, out: &mut W) -> Result<()>
    where
        S: ByteSource + ?Sized,
        W: Write,
    {
        let saved_cursor = self.cursor;
        let saved_offsets = (self.view.row_off, self.view.col_off);

        let mut state = FindState::new();
        let query = self.prompt(src, out, "Search: {} (Use ESC/Arrows/Enter)", |ed, q, key| {
            state.step(&mut ed.buffer, &mut ed.cursor, &mut ed.view, q, key);
        })?;

        if query.is_none() {
            self.cursor = saved_cursor;
            (self.view.row_off, self.view.col_off) = saved_offsets;
        }
        Ok(())
    }

    // -- Dispatch -----------------------------------------------------------

    /// Handle one key.
    ///
    /// # Errors
    ///
    /// Returns an error if a nested prompt fails to read or draw.
    pub fn process_key<S, W>(&mut self, key: Key, src: &mut S, out: &mut W) -> Result<Action>
    where
        S: ByteSource + ?Sized,
        W: Write,
    {
        match key {
            Key::ENTER => self.insert_newline(),
            QUIT => {
                if self.buffer.is_dirty() && self.quit_times > 0 {
                    self.set_status_message(format!(
                        "WARNING!!! File has unsaved changes. Press Ctrl-Q {} more times to quit.",
                        self.quit_times
                    ));
                    self.quit_times -= 1;
                    return Ok(Action::Continue);
                }
                debug!("quit");
                return Ok(Action::Quit);
            }
            SAVE => self.save(src, out)?,
            FIND => self.find(src, out)?,
            Key::Backspace | BACKSPACE_CTRL | Key::Delete => {
                if key == Key::Delete {
                    self.move_cursor(Key::ArrowRight);
                }
                self.delete_char();
            }
            Key::ArrowUp
            | Key::ArrowDown
            | Key::ArrowLeft
            | Key::ArrowRight
            | Key::Home
            | Key::End
            | Key::PageUp
            | Key::PageDown => self.move_cursor(key),
            REFRESH | Key::Escape => {}
            Key::Char(c) => self.insert_char(c),
        }

        self.quit_times = self.options.quit_times;
        Ok(Action::Continue)
    }

    /// Run until the user quits: draw, wait for a key, handle it.
    ///
    /// A read timeout just redraws, which lets the status message expire
    /// while the user is idle.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be read or written.
    pub fn run<S, W>(&mut self, src: &mut S, out: &mut W) -> Result<()>
    where
        S: ByteSource + ?Sized,
        W: Write,
    {
        loop {
            self.refresh_screen(out)?;
            let Some(key) = read_key(src)? else {
                continue;
            };
            if self.process_key(key, src, out)? == Action::Quit {
                return Ok(());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
