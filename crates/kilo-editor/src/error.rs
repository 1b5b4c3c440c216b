//! Error types for the editor core.
//!
//! Only unrecoverable failures are errors here: the terminal went away, or
//! the file named on the command line can't be read. Problems the user can
//! fix from inside the editor (a failed save, a search with no match) are
//! reported through the status message instead and never leave this crate
//! as `Err`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal editor error.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading keys or writing frames failed.
    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] io::Error),

    /// The file to edit exists but couldn't be read.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result alias for fallible editor operations.
pub type Result<T> = std::result::Result<T, Error>;
