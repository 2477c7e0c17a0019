//! TauNet protocol: wire constants and the message codec.
//!
//! A TauNet message is a cleartext header/body structure encrypted
//! end-to-end with the CipherSaber-2 cipher from [`taunet_crypto`]:
//!
//! ```text
//! version: <ver>\r\n
//! from: <sender>\r\n
//! to: <recipient>\r\n
//! \r\n
//! <body bytes>
//! ```
//!
//! Header order is fixed and mandatory. On the wire the encrypted message is
//! preceded by the cleartext IV, one message per TCP connection.
//!
//! [`TauNetMessage`] is the transport unit; it is constructed either from an
//! outgoing `(recipient, body)` pair or from inbound ciphertext, and in both
//! cases construction fully succeeds or fails with a [`ProtocolError`] -
//! no partial message is ever exposed.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod errors;
mod message;

pub use errors::{ProtocolError, Result};
pub use message::{TauNetMessage, WireConfig};

/// Protocol version spoken by this implementation.
pub const PROTOCOL_VERSION: &str = "0.2";

/// Default TCP port a TauNet daemon listens on.
pub const DEFAULT_PORT: u16 = 6283;

/// Receive buffer size; an inbound wire message cannot exceed this many
/// bytes, IV and headers included.
pub const BUF_SIZE: usize = 1024;

/// Maximum total wire-message size.
pub const MAX_WIRE_MESSAGE: usize = 1024;

/// Maximum header overhead in bytes.
pub const MAX_HEADERS: usize = 90;

/// Maximum body length. Outgoing bodies longer than this are silently
/// truncated before encryption.
pub const MAX_BODY: usize = MAX_WIRE_MESSAGE - MAX_HEADERS;

/// The two-byte header line terminator.
pub const LINE_TERMINATOR: &[u8] = b"\r\n";
