//! Error types for the message codec.

use taunet_crypto::CryptoError;
use thiserror::Error;

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while building or parsing a TauNet message.
///
/// Every variant is a malformed-protocol failure in the sense of the
/// protocol's error taxonomy: recoverable, logged by the daemon, and never
/// reported back over the wire. A wrong key or tampered ciphertext is
/// indistinguishable from a badly-formed message here - the cipher has no
/// integrity check, so such input surfaces as one of these parse failures
/// at best.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Fewer line separators than the three headers require.
    #[error("wrong header count or bad separators")]
    HeaderCount,

    /// A header line does not start with its expected `label: ` prefix.
    #[error("malformed '{header}' header")]
    HeaderFormat {
        /// Label of the offending header.
        header: &'static str,
    },

    /// A header carried no value after its label.
    #[error("empty '{header}' header")]
    EmptyHeader {
        /// Label of the offending header.
        header: &'static str,
    },

    /// The blank line separating headers from the body is missing.
    #[error("no blank line after headers")]
    MissingBlankLine,

    /// A header value or the body is not valid UTF-8.
    #[error("cleartext is not valid UTF-8")]
    InvalidUtf8,

    /// The cipher layer rejected the input outright.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
