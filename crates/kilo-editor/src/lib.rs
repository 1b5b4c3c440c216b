//! # kilo-editor: the editing core of kilo
//!
//! Everything between the terminal and the file lives here:
//!
//! - **[`syntax`]**: static per-language rule tables and file-type selection
//! - **[`highlight`]**: the per-row highlighting state machine
//! - **[`row`]**: one line: raw bytes, tab-expanded render, highlight classes
//! - **[`buffer`]**: the row store, comment cascade, file load and save
//! - **[`cursor`]**: arrow-key movement in raw-byte coordinates
//! - **[`view`]**: scrolling and composition of a frame
//! - **[`status`]**: the transient message-bar text
//! - **[`search`]**: incremental find with a match overlay
//! - **[`editor`]**: the session context: prompt, keypress dispatch, main loop
//! - **[`options`]**: tunable settings and `name=value` parsing
//!
//! The terminal itself (raw mode, key decoding, escape sequences) is
//! `kilo-term`'s job.

pub mod buffer;
pub mod cursor;
pub mod editor;
pub mod error;
pub mod highlight;
pub mod options;
pub mod row;
pub mod search;
pub mod status;
pub mod syntax;
pub mod view;

pub use buffer::Buffer;
pub use editor::{Action, Editor, HELP_MESSAGE};
pub use error::{Error, Result};
pub use options::{OptionError, Options};
