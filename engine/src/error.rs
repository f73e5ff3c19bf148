use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from persisting or loading an index.
///
/// A query for a token the index has never seen is not an error; it is an
/// empty result set (see [`crate::search`]).
#[derive(Debug, Error)]
pub enum IndexError {
    /// The index file does not exist or could not be opened for reading.
    #[error("index file not found: {path}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The index file violates the line grammar. The whole load fails; no
    /// partial index is returned.
    #[error("corrupt index at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },

    /// I/O failure while reading or writing index data.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
