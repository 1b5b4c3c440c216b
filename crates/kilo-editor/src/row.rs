//! A single line of text and its derived forms.
//!
//! Each [`Row`] keeps three parallel representations:
//!
//! - `chars`: the raw bytes as stored in the file
//! - `render`: `chars` with every tab expanded to spaces up to the next
//!   tab stop; one byte per screen cell
//! - `hl`: one [`Highlight`] per `render` byte
//!
//! The derived forms are private and only ever regenerated together, from
//! `chars`, through the row store. Coordinates come in two flavors: a
//! *cursor x* indexes `chars`, a *render x* indexes `render`. The two
//! mapping functions here convert between them.

use crate::highlight::Highlight;

/// One line of the document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    pub(crate) idx: usize,
    pub(crate) chars: Vec<u8>,
    pub(crate) render: Vec<u8>,
    pub(crate) hl: Vec<Highlight>,
    pub(crate) hl_open_comment: bool,
}

impl Row {
    /// A row with the given raw bytes. Derived forms are empty until the
    /// row store renders it.
    pub(crate) fn new(idx: usize, chars: Vec<u8>) -> Self {
        Self {
            idx,
            chars,
            ..Self::default()
        }
    }

    /// Position of this row in the document.
    #[inline]
    #[must_use]
    pub const fn idx(&self) -> usize {
        self.idx
    }

    /// Raw bytes.
    #[inline]
    #[must_use]
    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    /// Raw length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the row has no bytes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Tab-expanded bytes, one per screen cell.
    #[inline]
    #[must_use]
    pub fn render(&self) -> &[u8] {
        &self.render
    }

    /// Highlight class of each render byte.
    #[inline]
    #[must_use]
    pub fn hl(&self) -> &[Highlight] {
        &self.hl
    }

    /// Whether an unterminated block comment is open at the end of this row.
    #[inline]
    #[must_use]
    pub const fn hl_open_comment(&self) -> bool {
        self.hl_open_comment
    }

    /// Convert a raw column to a render column.
    #[must_use]
    pub fn cx_to_rx(&self, cx: usize, tab_stop: usize) -> usize {
        cx_to_rx(&self.chars, cx, tab_stop)
    }

    /// Convert a render column to a raw column.
    #[must_use]
    pub fn rx_to_cx(&self, rx: usize, tab_stop: usize) -> usize {
        rx_to_cx(&self.chars, rx, tab_stop)
    }

    /// Regenerate `render` from `chars`. The caller re-highlights.
    pub(crate) fn update_render(&mut self, tab_stop: usize) {
        self.render = expand_tabs(&self.chars, tab_stop);
    }
}

// ---------------------------------------------------------------------------
// Tab expansion and coordinate mapping
// ---------------------------------------------------------------------------

/// Expand each tab to spaces up to the next multiple of `tab_stop`.
///
/// A tab always produces at least one space.
#[must_use]
pub fn expand_tabs(chars: &[u8], tab_stop: usize) -> Vec<u8> {
    let tab_stop = tab_stop.max(1);
    let tabs = chars.iter().filter(|&&c| c == b'\t').count();
    let mut render = Vec::with_capacity(chars.len() + tabs * (tab_stop - 1));

    for &c in chars {
        if c == b'\t' {
            render.push(b' ');
            while render.len() % tab_stop != 0 {
                render.push(b' ');
            }
        } else {
            render.push(c);
        }
    }
    render
}

/// Render column of raw column `cx`.
///
/// `cx` past the end of the row is treated as the row's end.
#[must_use]
pub fn cx_to_rx(chars: &[u8], cx: usize, tab_stop: usize) -> usize {
    let tab_stop = tab_stop.max(1);
    chars.iter().take(cx).fold(0, |rx, &c| {
        if c == b'\t' {
            rx + tab_stop - (rx % tab_stop)
        } else {
            rx + 1
        }
    })
}

/// Raw column whose render cells cover render column `rx`.
///
/// Returns the row length when `rx` is past the rendered end.
#[must_use]
pub fn rx_to_cx(chars: &[u8], rx: usize, tab_stop: usize) -> usize {
    let tab_stop = tab_stop.max(1);
    let mut cur_rx = 0;
    for (cx, &c) in chars.iter().enumerate() {
        if c == b'\t' {
            cur_rx += tab_stop - (cur_rx % tab_stop);
        } else {
            cur_rx += 1;
        }
        if cur_rx > rx {
            return cx;
        }
    }
    chars.len()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn expand_plain_bytes() {
        assert_eq!(expand_tabs(b"abc", 4), b"abc".to_vec());
        assert_eq!(expand_tabs(b"", 4), Vec::<u8>::new());
    }

    #[test]
    fn single_tab_is_a_full_stop() {
        assert_eq!(expand_tabs(b"\t", 4), b"    ".to_vec());
    }

    #[test]
    fn tab_pads_to_next_stop() {
        assert_eq!(expand_tabs(b"ab\tc", 4), b"ab  c".to_vec());
        assert_eq!(expand_tabs(b"abc\td", 4), b"abc d".to_vec());
        assert_eq!(expand_tabs(b"abcd\te", 4), b"abcd    e".to_vec());
        assert_eq!(expand_tabs(b"\t\t", 4), b"        ".to_vec());
    }

    #[test]
    fn tab_stop_of_one() {
        assert_eq!(expand_tabs(b"a\tb", 1), b"a b".to_vec());
    }

    #[test]
    fn inserting_before_a_tab_keeps_the_tail() {
        let before = expand_tabs(b"\tx", 4);
        let after = expand_tabs(b"a\tx", 4);
        assert_eq!(before, b"    x".to_vec());
        assert_eq!(after, b"a   x".to_vec());
    }

    #[test]
    fn cx_to_rx_without_tabs_is_identity() {
        for cx in 0..=5 {
            assert_eq!(cx_to_rx(b"hello", cx, 4), cx);
        }
    }

    #[test]
    fn cx_to_rx_with_tabs() {
        let chars = b"a\tb\t\tc";
        assert_eq!(cx_to_rx(chars, 0, 4), 0);
        assert_eq!(cx_to_rx(chars, 1, 4), 1);
        assert_eq!(cx_to_rx(chars, 2, 4), 4);
        assert_eq!(cx_to_rx(chars, 3, 4), 5);
        assert_eq!(cx_to_rx(chars, 4, 4), 8);
        assert_eq!(cx_to_rx(chars, 5, 4), 12);
        assert_eq!(cx_to_rx(chars, 6, 4), 13);
    }

    #[test]
    fn cx_to_rx_past_end_clamps() {
        assert_eq!(cx_to_rx(b"ab", 10, 4), 2);
    }

    #[test]
    fn rx_to_cx_inside_a_tab_maps_to_the_tab() {
        let chars = b"a\tb";
        assert_eq!(rx_to_cx(chars, 0, 4), 0);
        assert_eq!(rx_to_cx(chars, 1, 4), 1);
        assert_eq!(rx_to_cx(chars, 2, 4), 1);
        assert_eq!(rx_to_cx(chars, 3, 4), 1);
        assert_eq!(rx_to_cx(chars, 4, 4), 2);
    }

    #[test]
    fn rx_to_cx_past_end_is_row_length() {
        assert_eq!(rx_to_cx(b"a\tb", 99, 4), 3);
        assert_eq!(rx_to_cx(b"", 0, 4), 0);
    }

    #[test]
    fn mappings_are_inverse() {
        let rows: [&[u8]; 5] = [b"plain", b"\t", b"\t\tx", b"ab\tcd\t\tef", b"x\ty\tz\t"];
        for tab_stop in [1, 2, 4, 8] {
            for chars in rows {
                for cx in 0..=chars.len() {
                    let rx = cx_to_rx(chars, cx, tab_stop);
                    assert_eq!(
                        rx_to_cx(chars, rx, tab_stop),
                        cx,
                        "chars={chars:?} cx={cx} tab_stop={tab_stop}"
                    );
                }
            }
        }
    }

    #[test]
    fn render_length_matches_mapping() {
        let chars = b"ab\tcd\t\tef";
        assert_eq!(expand_tabs(chars, 4).len(), cx_to_rx(chars, chars.len(), 4));
    }

    #[test]
    fn row_accessors() {
        let mut row = Row::new(3, b"\tx".to_vec());
        row.update_render(4);
        assert_eq!(row.idx(), 3);
        assert_eq!(row.len(), 2);
        assert!(!row.is_empty());
        assert_eq!(row.render(), b"    x");
        assert_eq!(row.cx_to_rx(1, 4), 4);
        assert_eq!(row.rx_to_cx(2, 4), 0);
    }
}
