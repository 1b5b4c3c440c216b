//! Language rule tables for the highlighter.
//!
//! Each [`Syntax`] is a static, read-only description of one file type:
//! which file names it applies to, its keywords, its comment markers and
//! which literal kinds to color. The editor holds at most one active
//! `&'static Syntax`; rows never own one.
//!
//! Keywords ending in `|` belong to the secondary class (types, mostly).
//! The `|` is a marker, not part of the keyword.

use std::path::Path;

use bitflags::bitflags;

bitflags! {
    /// Which literal kinds a language highlights.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct SyntaxFlags: u8 {
        const NUMBERS = 0b0000_0001;
        const STRINGS = 0b0000_0010;
    }
}

/// Highlighting rules for one file type.
#[derive(Debug, PartialEq, Eq)]
pub struct Syntax {
    /// Display name shown in the status bar.
    pub filetype: &'static str,
    /// Patterns selecting this syntax. A pattern starting with `.` must
    /// equal the file's extension; any other pattern matches as a
    /// substring of the file name.
    pub filematch: &'static [&'static str],
    /// Keywords; a trailing `|` selects the secondary keyword class.
    pub keywords: &'static [&'static str],
    /// Marker that comments out the rest of the line.
    pub singleline_comment: Option<&'static str>,
    /// Start and end markers of a block comment.
    pub multiline_comment: Option<(&'static str, &'static str)>,
    pub flags: SyntaxFlags,
}

impl Syntax {
    /// Whether this syntax applies to `path`.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let ext = name.rfind('.').map(|i| &name[i..]);

        self.filematch.iter().any(|pattern| {
            if pattern.starts_with('.') {
                ext == Some(*pattern)
            } else {
                name.contains(pattern)
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Built-in database
// ---------------------------------------------------------------------------

const C_KEYWORDS: &[&str] = &[
    "switch", "if", "while", "for", "break", "continue", "return", "else", "struct", "union",
    "typedef", "static", "enum", "class", "case", "default", "#include", "#define",
    "int|", "long|", "double|", "float|", "char|", "unsigned|", "signed|", "void|", "const|",
    "size_t|", "bool|",
];

const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "fn", "for", "if",
    "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "self",
    "static", "struct", "trait", "type", "unsafe", "use", "where", "while",
    "bool|", "char|", "str|", "u8|", "u16|", "u32|", "u64|", "usize|", "i8|", "i16|", "i32|",
    "i64|", "isize|", "f32|", "f64|", "Self|", "String|", "Vec|", "Option|", "Result|",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "break", "class", "continue", "def", "del", "elif", "else", "except",
    "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "nonlocal", "not",
    "or", "pass", "raise", "return", "try", "while", "with", "yield",
    "None|", "True|", "False|", "int|", "float|", "str|", "bytes|", "list|", "dict|", "set|",
    "tuple|",
];

/// The C-family rule set.
pub static C: Syntax = Syntax {
    filetype: "c",
    filematch: &[".c", ".h", ".cpp"],
    keywords: C_KEYWORDS,
    singleline_comment: Some("//"),
    multiline_comment: Some(("/*", "*/")),
    flags: SyntaxFlags::NUMBERS.union(SyntaxFlags::STRINGS),
};

/// The Rust rule set.
pub static RUST: Syntax = Syntax {
    filetype: "rust",
    filematch: &[".rs"],
    keywords: RUST_KEYWORDS,
    singleline_comment: Some("//"),
    multiline_comment: Some(("/*", "*/")),
    flags: SyntaxFlags::NUMBERS.union(SyntaxFlags::STRINGS),
};

/// The Python rule set. Python has no block comments.
pub static PYTHON: Syntax = Syntax {
    filetype: "python",
    filematch: &[".py"],
    keywords: PYTHON_KEYWORDS,
    singleline_comment: Some("#"),
    multiline_comment: None,
    flags: SyntaxFlags::NUMBERS.union(SyntaxFlags::STRINGS),
};

/// Every built-in syntax, in match priority order.
pub static DATABASE: &[&Syntax] = &[&C, &RUST, &PYTHON];

/// Pick the syntax for `path`, or `None` for plain text.
#[must_use]
pub fn select(path: &Path) -> Option<&'static Syntax> {
    DATABASE.iter().copied().find(|s| s.matches(path))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
