//! Incremental search.
//!
//! [`FindState`] is the per-session state of one find prompt: where the
//! last match was, which way to step, and the highlight that the match
//! overlay replaced. The editor feeds it every prompt keystroke through
//! [`FindState::step`]; arrows step between matches, any edit to the query
//! restarts from the top.
//!
//! The match overlay is transient. Every step first puts back the saved
//! highlight, so at most one row carries [`Highlight::Match`] at a time and
//! none does once the prompt closes.

use kilo_term::input::Key;

use crate::buffer::Buffer;
use crate::cursor::Cursor;
use crate::highlight::Highlight;
use crate::view::View;

/// Search direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

/// State carried between keystrokes of one find prompt.
#[derive(Debug, Default)]
pub struct FindState {
    last_match: Option<usize>,
    direction: SearchDirection,
    saved_hl: Option<(usize, Vec<Highlight>)>,
}

impl FindState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Row of the current match, if any.
    #[must_use]
    pub const fn last_match(&self) -> Option<usize> {
        self.last_match
    }

    #[must_use]
    pub const fn direction(&self) -> SearchDirection {
        self.direction
    }

    /// React to one prompt keystroke with the query as it now reads.
    ///
    /// Enter and Escape end the session: the overlay is removed and the
    /// state reset. Right/Down step forward from the last match, Left/Up
    /// step backward; any other key restarts the search forward from the
    /// top. An empty query or a query found nowhere leaves the cursor
    /// where it is.
    pub fn step(
        &mut self,
        buf: &mut Buffer,
        cursor: &mut Cursor,
        view: &mut View,
        query: &str,
        key: Key,
    ) {
        if let Some((row, hl)) = self.saved_hl.take() {
            buf.restore_highlight(row, hl);
        }

        match key {
            Key::ENTER | Key::Escape => {
                self.last_match = None;
                self.direction = SearchDirection::Forward;
                return;
            }
            Key::ArrowRight | Key::ArrowDown => self.direction = SearchDirection::Forward,
            Key::ArrowLeft | Key::ArrowUp => self.direction = SearchDirection::Backward,
            _ => {
                self.last_match = None;
                self.direction = SearchDirection::Forward;
            }
        }
        if self.last_match.is_none() {
            self.direction = SearchDirection::Forward;
        }

        let Some((row, col)) = self.find_next(buf, query.as_bytes()) else {
            return;
        };
        self.last_match = Some(row);
        cursor.cy = row;
        cursor.cx = buf.row(row).map_or(0, |r| r.rx_to_cx(col, buf.tab_stop()));
        // Past the end, so the next scroll puts the match row on top.
        view.row_off = buf.len();
        self.saved_hl = buf
            .mark_match(row, col, query.len())
            .map(|saved| (row, saved));
    }

    /// Scan at most every row once, starting after the last match in the
    /// current direction and wrapping. Returns the row and render column of
    /// the first hit.
    fn find_next(&self, buf: &Buffer, query: &[u8]) -> Option<(usize, usize)> {
        let n = buf.len();
        if query.is_empty() || n == 0 {
            return None;
        }

        let mut current = self.last_match;
        for _ in 0..n {
            let next = match (self.direction, current) {
                (SearchDirection::Forward, None) => 0,
                (SearchDirection::Forward, Some(i)) => (i + 1) % n,
                (SearchDirection::Backward, None | Some(0)) => n - 1,
                (SearchDirection::Backward, Some(i)) => i - 1,
            };
            current = Some(next);
            if let Some(col) = buf.row(next).and_then(|r| find_bytes(r.render(), query)) {
                return Some((next, col));
            }
        }
        None
    }
}

/// Byte offset of the first occurrence of `needle` in `haystack`.
#[must_use]
pub fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Fixture {
        buf: Buffer,
        cursor: Cursor,
        view: View,
        find: FindState,
    }

    impl Fixture {
        fn new(lines: &[&str]) -> Self {
            Self {
                buf: Buffer::from_lines(4, lines),
                cursor: Cursor::new(),
                view: View::new(10, 80),
                find: FindState::new(),
            }
        }

        fn key(&mut self, query: &str, key: Key) {
            self.find
                .step(&mut self.buf, &mut self.cursor, &mut self.view, query, key);
        }
    }

    #[test]
    fn find_bytes_basics() {
        assert_eq!(find_bytes(b"hello", b"ll"), Some(2));
        assert_eq!(find_bytes(b"hello", b"z"), None);
        assert_eq!(find_bytes(b"hi", b"high"), None);
        assert_eq!(find_bytes(b"abc", b""), Some(0));
    }

    #[test]
    fn forward_search_wraps() {
        let mut f = Fixture::new(&["foo", "bar", "foo"]);
        f.key("foo", Key::Char(b'o'));
        assert_eq!(f.cursor.cy, 0);
        f.key("foo", Key::ArrowDown);
        assert_eq!(f.cursor.cy, 2);
        f.key("foo", Key::ArrowDown);
        assert_eq!(f.cursor.cy, 0);
        f.key("foo", Key::ArrowRight);
        assert_eq!(f.cursor.cy, 2);
    }

    #[test]
    fn backward_search_wraps() {
        let mut f = Fixture::new(&["foo", "bar", "foo"]);
        f.key("foo", Key::Char(b'o'));
        assert_eq!(f.cursor.cy, 0);
        f.key("foo", Key::ArrowUp);
        assert_eq!(f.cursor.cy, 2);
        f.key("foo", Key::ArrowLeft);
        assert_eq!(f.cursor.cy, 0);
        assert_eq!(f.find.direction(), SearchDirection::Backward);
    }

    #[test]
    fn arrow_without_a_match_searches_forward() {
        let mut f = Fixture::new(&["a", "b", "a"]);
        f.key("a", Key::ArrowUp);
        assert_eq!(f.cursor.cy, 0);
        assert_eq!(f.find.direction(), SearchDirection::Forward);
    }

    #[test]
    fn absent_query_leaves_cursor() {
        let mut f = Fixture::new(&["foo", "bar", "foo"]);
        f.cursor = Cursor::at(1, 1);
        f.key("zzz", Key::Char(b'z'));
        assert_eq!(f.cursor, Cursor::at(1, 1));
        assert_eq!(f.find.last_match(), None);
        assert_eq!(f.view.row_off, 0);
    }

    #[test]
    fn empty_query_leaves_cursor() {
        let mut f = Fixture::new(&["foo", "bar"]);
        f.cursor = Cursor::at(2, 1);
        f.key("", Key::Backspace);
        assert_eq!(f.cursor, Cursor::at(2, 1));
    }

    #[test]
    fn match_column_maps_through_tabs() {
        let mut f = Fixture::new(&["\tneedle"]);
        f.key("needle", Key::Char(b'e'));
        assert_eq!(f.cursor, Cursor::at(1, 0));
    }

    #[test]
    fn match_forces_row_to_top() {
        let mut f = Fixture::new(&["x"; 40]);
        f.buf.insert_row(30, b"target");
        f.key("target", Key::Char(b't'));
        assert_eq!(f.view.row_off, f.buf.len());
        f.view.scroll(f.cursor, &f.buf);
        assert_eq!(f.view.row_off, 30);
    }

    #[test]
    fn overlay_is_applied_and_undone() {
        let mut f = Fixture::new(&["xfoox"]);
        f.key("foo", Key::Char(b'o'));
        let hl = f.buf.row(0).unwrap().hl().to_vec();
        assert_eq!(
            hl,
            vec![
                Highlight::Normal,
                Highlight::Match,
                Highlight::Match,
                Highlight::Match,
                Highlight::Normal
            ]
        );

        f.key("foo", Key::ENTER);
        assert!(f.buf.row(0).unwrap().hl().iter().all(|&h| h == Highlight::Normal));
        assert_eq!(f.find.last_match(), None);
    }

    #[test]
    fn overlay_moves_with_the_match() {
        let mut f = Fixture::new(&["ab", "ab"]);
        f.key("ab", Key::Char(b'b'));
        f.key("ab", Key::ArrowDown);
        assert_eq!(f.buf.row(0).unwrap().hl(), &[Highlight::Normal; 2]);
        assert_eq!(f.buf.row(1).unwrap().hl(), &[Highlight::Match; 2]);
        f.key("ab", Key::Escape);
        assert_eq!(f.buf.row(1).unwrap().hl(), &[Highlight::Normal; 2]);
    }

    #[test]
    fn editing_the_query_restarts_from_top() {
        let mut f = Fixture::new(&["ab", "abc", "abc"]);
        f.key("ab", Key::Char(b'b'));
        f.key("ab", Key::ArrowDown);
        assert_eq!(f.cursor.cy, 1);
        f.key("abc", Key::Char(b'c'));
        assert_eq!(f.cursor.cy, 1);
        assert_eq!(f.find.last_match(), Some(1));
    }

    #[test]
    fn empty_buffer_is_fine() {
        let mut f = Fixture::new(&[]);
        f.key("x", Key::Char(b'x'));
        assert_eq!(f.cursor, Cursor::new());
    }
}
