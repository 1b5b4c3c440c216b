//! Syntax highlighting: per-byte classification of a row's render form.
//!
//! [`highlight_line`] is a pure function: given a row's render bytes, the
//! active [`Syntax`] and whether the previous row ended inside a block
//! comment, it returns one [`Highlight`] per byte and whether this row ends
//! inside a block comment. The row store calls it whenever a row changes
//! and cascades to the following rows while that end state keeps changing.
//!
//! # Scan
//!
//! Left to right, each byte is claimed by the first rule that applies:
//!
//! 1. single-line comment marker (outside strings and block comments):
//!    the rest of the row is a comment
//! 2. block comment: inside one, or at its start marker; markers are
//!    consumed whole
//! 3. string: inside one (with one-byte backslash escapes), or at an
//!    opening `"`, `'` or `` ` ``
//! 4. number: a digit after a separator or another number byte, or a `.`
//!    right after a number byte
//! 5. keyword: at a separator boundary, the longest keyword that is
//!    followed by a separator (or the row end)
//!
//! Anything left over is [`Highlight::Normal`].

use kilo_term::ansi::Color;

use crate::syntax::{Syntax, SyntaxFlags};

/// Classification of one render byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Highlight {
    #[default]
    Normal,
    Comment,
    MlComment,
    Keyword1,
    Keyword2,
    String,
    Number,
    /// Transient overlay for the current search match.
    Match,
}

impl Highlight {
    /// Foreground color for this class.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Comment | Self::MlComment => Color::Cyan,
            Self::Keyword1 => Color::Yellow,
            Self::Keyword2 => Color::Green,
            Self::String => Color::Magenta,
            Self::Number => Color::Red,
            Self::Match => Color::Blue,
            Self::Normal => Color::Default,
        }
    }
}

/// Punctuation that delimits tokens, besides whitespace and NUL.
const SEPARATORS: &[u8] = b",.()+-/*=~%<>[];";

/// Whether `c` ends a keyword or allows a number to start after it.
#[must_use]
pub fn is_separator(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c | 0) || SEPARATORS.contains(&c)
}

/// Classify every byte of `render`.
///
/// `in_comment` says whether the previous row ended inside a block comment.
/// Returns the classes (same length as `render`) and whether this row ends
/// inside a block comment. Without a syntax everything is normal and no
/// comment stays open.
#[must_use]
pub fn highlight_line(
    render: &[u8],
    syntax: Option<&Syntax>,
    in_comment: bool,
) -> (Vec<Highlight>, bool) {
    let mut hl = vec![Highlight::Normal; render.len()];
    let Some(syntax) = syntax else {
        return (hl, false);
    };

    let scs = syntax.singleline_comment.map(str::as_bytes);
    let mcs = syntax
        .multiline_comment
        .map(|(start, end)| (start.as_bytes(), end.as_bytes()));

    let mut prev_sep = true;
    let mut in_string: Option<u8> = None;
    let mut in_comment = in_comment && mcs.is_some();

    let mut i = 0;
    while i < render.len() {
        let c = render[i];
        let prev_hl = if i > 0 { hl[i - 1] } else { Highlight::Normal };
        let rest = &render[i..];

        if let Some(scs) = scs {
            if in_string.is_none() && !in_comment && rest.starts_with(scs) {
                hl[i..].fill(Highlight::Comment);
                break;
            }
        }

        if let Some((start, end)) = mcs {
            if in_string.is_none() {
                if in_comment {
                    if rest.starts_with(end) {
                        hl[i..i + end.len()].fill(Highlight::MlComment);
                        i += end.len();
                        in_comment = false;
                        prev_sep = true;
                    } else {
                        hl[i] = Highlight::MlComment;
                        i += 1;
                    }
                    continue;
                }
                if rest.starts_with(start) {
                    hl[i..i + start.len()].fill(Highlight::MlComment);
                    i += start.len();
                    in_comment = true;
                    continue;
                }
            }
        }

        if syntax.flags.contains(SyntaxFlags::STRINGS) {
            if let Some(quote) = in_string {
                hl[i] = Highlight::String;
                if c == b'\\' && i + 1 < render.len() {
                    hl[i + 1] = Highlight::String;
                    i += 2;
                    continue;
                }
                if c == quote {
                    in_string = None;
                }
                i += 1;
                prev_sep = true;
                continue;
            }
            if matches!(c, b'"' | b'\'' | b'`') {
                in_string = Some(c);
                hl[i] = Highlight::String;
                i += 1;
                continue;
            }
        }

        if syntax.flags.contains(SyntaxFlags::NUMBERS)
            && ((c.is_ascii_digit() && (prev_sep || prev_hl == Highlight::Number))
                || (c == b'.' && prev_hl == Highlight::Number))
        {
            hl[i] = Highlight::Number;
            i += 1;
            prev_sep = false;
            continue;
        }

        if prev_sep {
            if let Some((len, class)) = match_keyword(rest, syntax.keywords) {
                hl[i..i + len].fill(class);
                i += len;
                prev_sep = false;
                continue;
            }
        }

        prev_sep = is_separator(c);
        i += 1;
    }

    (hl, in_comment)
}

/// Longest keyword at the start of `text` that ends at a token boundary.
///
/// Returns its length and class.
fn match_keyword(text: &[u8], keywords: &[&str]) -> Option<(usize, Highlight)> {
    keywords
        .iter()
        .filter_map(|kw| {
            let (word, class) = kw
                .strip_suffix('|')
                .map_or((*kw, Highlight::Keyword1), |w| (w, Highlight::Keyword2));
            let word = word.as_bytes();
            let boundary = text.get(word.len()).is_none_or(|&b| is_separator(b));
            (!word.is_empty() && text.starts_with(word) && boundary).then_some((word.len(), class))
        })
        .max_by_key(|&(len, _)| len)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
