//! Server error types.

use taunet_core::{DirectoryError, StorageError};
use thiserror::Error;

/// Errors that can occur in the daemon.
///
/// Only configuration errors are fatal; transport errors on individual
/// connections are logged inside the accept loop and never escape it.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Invalid or incomplete startup configuration. The daemon refuses to
    /// run rather than operate partially initialized.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport/network error.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The user directory failed to load.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Storage failed to open or write.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
