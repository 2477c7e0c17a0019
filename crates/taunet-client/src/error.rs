//! Sender error types.

use taunet_proto::ProtocolError;
use thiserror::Error;

/// Errors reported to the caller of a send.
///
/// Transport failures are reported, logged, and never retried - one
/// connect/send/shutdown cycle per call is the whole contract.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The outgoing message could not be built (empty key and the like).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Connect or send failed outright.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Connect or send did not complete within the configured timeout.
    #[error("timed out reaching {host}:{port}")]
    Timeout {
        /// Host that did not answer in time.
        host: String,
        /// Port the connection was aimed at.
        port: u16,
    },
}
