//! Storage error types.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised by storage implementations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The message directory does not exist. Checked at startup and fatal
    /// there: the node refuses to run half-initialized rather than
    /// discover the problem on the first accepted message.
    #[error("message directory '{path}' does not exist")]
    MissingDirectory {
        /// The directory that was expected.
        path: PathBuf,
    },

    /// An underlying filesystem operation failed.
    #[error("storage io error on '{path}': {source}")]
    Io {
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}
