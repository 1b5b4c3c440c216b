//! Row store: the document as an ordered list of [`Row`]s.
//!
//! The `Buffer` owns every row, the dirty counter, the file name and the
//! active syntax. All mutation goes through it so the row invariants hold:
//!
//! - `rows[i].idx == i` for every row, after every insert and delete
//! - `render` and `hl` are regenerated from `chars` whenever `chars` changes
//! - a row's highlight is consistent with its predecessor's
//!   `hl_open_comment`
//!
//! # Comment cascade
//!
//! Re-highlighting a row can flip whether it ends inside a block comment.
//! When it does, the next row's highlight is stale too. [`Buffer::update_row`]
//! walks forward with a plain loop, re-highlighting successors until a row's
//! open-comment state comes out unchanged (or the document ends). No
//! recursion, so a huge comment toggle can't blow the stack.
//!
//! # File format
//!
//! Files are split on `\n`; trailing `\r` and `\n` bytes are stripped from
//! each line. Saving joins rows with `\n` and terminates the last one too.
//! Bytes are stored as-is: no encoding is assumed.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::highlight::{Highlight, highlight_line};
use crate::options::TAB_STOP;
use crate::row::Row;
use crate::syntax::{self, Syntax};

/// The document being edited.
#[derive(Debug, Clone)]
pub struct Buffer {
    rows: Vec<Row>,
    dirty: usize,
    filename: Option<PathBuf>,
    syntax: Option<&'static Syntax>,
    tab_stop: usize,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new(TAB_STOP)
    }
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// An empty, unnamed, clean buffer.
    #[must_use]
    pub fn new(tab_stop: usize) -> Self {
        Self {
            rows: Vec::new(),
            dirty: 0,
            filename: None,
            syntax: None,
            tab_stop: tab_stop.max(1),
        }
    }

    /// Build a buffer from lines of text. Used by tests and scratch buffers.
    #[must_use]
    pub fn from_lines<I, L>(tab_stop: usize, lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[u8]>,
    {
        let mut buf = Self::new(tab_stop);
        for line in lines {
            buf.insert_row(buf.len(), line.as_ref());
        }
        buf.dirty = 0;
        buf
    }

    // -- Accessors ----------------------------------------------------------

    /// All rows, in order.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The row at `at`, if any.
    #[inline]
    #[must_use]
    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the document has no rows at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Count of modifications since the last load or save.
    #[inline]
    #[must_use]
    pub const fn dirty(&self) -> usize {
        self.dirty
    }

    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty > 0
    }

    /// File the buffer is bound to.
    #[inline]
    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Active highlighting rules.
    #[inline]
    #[must_use]
    pub const fn syntax(&self) -> Option<&'static Syntax> {
        self.syntax
    }

    #[inline]
    #[must_use]
    pub const fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    // -- File binding and syntax ---------------------------------------------

    /// Bind the buffer to `path` and pick the syntax from its name.
    pub fn set_filename(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        let syntax = syntax::select(&path);
        self.filename = Some(path);
        self.set_syntax(syntax);
    }

    /// Switch the highlighting rules and re-highlight every row.
    pub fn set_syntax(&mut self, syntax: Option<&'static Syntax>) {
        if let Some(s) = syntax {
            debug!(filetype = s.filetype, "syntax selected");
        }
        self.syntax = syntax;

        let mut in_comment = false;
        for row in &mut self.rows {
            let (hl, open) = highlight_line(&row.render, self.syntax, in_comment);
            row.hl = hl;
            row.hl_open_comment = open;
            in_comment = open;
        }
    }

    // -- Row rendering -------------------------------------------------------

    /// Regenerate the render and highlight of row `at` from its bytes, then
    /// cascade the highlight forward as long as the open-comment state keeps
    /// changing.
    pub fn update_row(&mut self, at: usize) {
        let Some(row) = self.rows.get_mut(at) else {
            return;
        };
        row.update_render(self.tab_stop);
        self.rehighlight_from(at);
    }

    /// Re-highlight `at` unconditionally, then its successors until one
    /// ends in the same comment state it had before.
    fn rehighlight_from(&mut self, mut at: usize) {
        while at < self.rows.len() {
            let in_comment = at > 0 && self.rows[at - 1].hl_open_comment;
            let row = &mut self.rows[at];
            let (hl, open) = highlight_line(&row.render, self.syntax, in_comment);
            row.hl = hl;
            let changed = row.hl_open_comment != open;
            row.hl_open_comment = open;
            if !changed {
                break;
            }
            at += 1;
        }
    }

    // -- Structural edits ----------------------------------------------------

    /// Insert a new row holding `chars` at index `at`. Out-of-range
    /// indices are ignored.
    pub fn insert_row(&mut self, at: usize, chars: &[u8]) {
        if at > self.rows.len() {
            return;
        }
        self.rows.insert(at, Row::new(at, chars.to_vec()));
        for (i, row) in self.rows.iter_mut().enumerate().skip(at + 1) {
            row.idx = i;
        }
        self.update_row(at);
        // The old occupant of `at` now follows a different row.
        self.rehighlight_from(at + 1);
        self.dirty += 1;
    }

    /// Remove row `at`. Out-of-range indices are ignored.
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        for (i, row) in self.rows.iter_mut().enumerate().skip(at) {
            row.idx = i;
        }
        self.rehighlight_from(at);
        self.dirty += 1;
    }

    // -- In-row edits --------------------------------------------------------

    /// Insert byte `c` into row `row` at column `at`. A column past the end
    /// appends.
    pub fn insert_char(&mut self, row: usize, at: usize, c: u8) {
        let Some(r) = self.rows.get_mut(row) else {
            return;
        };
        let at = at.min(r.chars.len());
        r.chars.insert(at, c);
        self.update_row(row);
        self.dirty += 1;
    }

    /// Append `s` to the end of row `row`.
    pub fn append_string(&mut self, row: usize, s: &[u8]) {
        let Some(r) = self.rows.get_mut(row) else {
            return;
        };
        r.chars.extend_from_slice(s);
        self.update_row(row);
        self.dirty += 1;
    }

    /// Delete the byte at column `at` of row `row`. Out-of-range columns
    /// are ignored.
    pub fn delete_char(&mut self, row: usize, at: usize) {
        let Some(r) = self.rows.get_mut(row) else {
            return;
        };
        if at >= r.chars.len() {
            return;
        }
        r.chars.remove(at);
        self.update_row(row);
        self.dirty += 1;
    }

    /// Cut row `row` at column `at`, returning the removed tail.
    pub fn split_off(&mut self, row: usize, at: usize) -> Vec<u8> {
        let Some(r) = self.rows.get_mut(row) else {
            return Vec::new();
        };
        let at = at.min(r.chars.len());
        let tail = r.chars.split_off(at);
        self.update_row(row);
        self.dirty += 1;
        tail
    }

    // -- Search overlay ------------------------------------------------------

    /// Paint `len` render bytes of row `row` starting at `start` with the
    /// match class. Returns the row's previous highlight for
    /// [`restore_highlight`](Self::restore_highlight).
    pub fn mark_match(&mut self, row: usize, start: usize, len: usize) -> Option<Vec<Highlight>> {
        let r = self.rows.get_mut(row)?;
        let saved = r.hl.clone();
        let end = start.saturating_add(len).min(r.hl.len());
        if start < end {
            r.hl[start..end].fill(Highlight::Match);
        }
        Some(saved)
    }

    /// Put back a highlight saved by [`mark_match`](Self::mark_match). Does
    /// nothing if the row has since changed length.
    pub fn restore_highlight(&mut self, row: usize, saved: Vec<Highlight>) {
        if let Some(r) = self.rows.get_mut(row) {
            if r.hl.len() == saved.len() {
                r.hl = saved;
            }
        }
    }

    // -- Serialization -------------------------------------------------------

    /// The whole document: every row followed by `\n`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let total = self.rows.iter().map(|r| r.chars.len() + 1).sum();
        let mut out = Vec::with_capacity(total);
        for row in &self.rows {
            out.extend_from_slice(&row.chars);
            out.push(b'\n');
        }
        out
    }

    // -- File I/O ------------------------------------------------------------

    /// Load `path` into this buffer, replacing its contents.
    ///
    /// A file that does not exist yet opens as an empty buffer bound to
    /// that name; the first save creates it. The buffer starts clean.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Open`] if the file exists but can't be read.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "new file");
                Vec::new()
            }
            Err(source) => {
                return Err(Error::Open {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        self.rows.clear();
        self.set_filename(path);
        for line in split_lines(&data) {
            self.insert_row(self.rows.len(), line);
        }
        self.dirty = 0;
        info!(path = %path.display(), rows = self.rows.len(), "file loaded");
        Ok(())
    }

    /// Write the document to its file. Returns the number of bytes written.
    ///
    /// The file is created with mode `0644` if missing, truncated to the new
    /// length, then written in one go. The buffer is marked clean on
    /// success.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer has no file name or any step of the
    /// write fails. The buffer stays dirty.
    pub fn save(&mut self) -> io::Result<usize> {
        let path = self
            .filename
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "buffer has no file name"))?;
        let content = self.to_bytes();

        let mut opts = OpenOptions::new();
        opts.read(true).write(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(0o644);
        }
        let mut file = opts.open(&path)?;
        file.set_len(content.len() as u64)?;
        file.write_all(&content)?;

        self.dirty = 0;
        info!(path = %path.display(), bytes = content.len(), "file saved");
        Ok(content.len())
    }
}

/// Split file bytes into lines, dropping line terminators. A final
/// terminator does not start an extra empty line.
fn split_lines(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    let body = data.strip_suffix(b"\n").unwrap_or(data);
    let empty = data.is_empty();
    body.split(|&b| b == b'\n')
        .filter(move |_| !empty)
        .map(|line| {
            let end = line
                .iter()
                .rposition(|&b| b != b'\r' && b != b'\n')
                .map_or(0, |i| i + 1);
            &line[..end]
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
