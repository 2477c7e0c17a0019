//! The TauNet transport unit: headers, body, and ciphertext.

use taunet_crypto::{DEFAULT_IV_LENGTH, DEFAULT_ROUNDS, decrypt, encrypt};

use crate::{
    MAX_BODY, PROTOCOL_VERSION,
    errors::{ProtocolError, Result},
};

/// Header labels in their fixed, mandatory wire order.
const HEADER_LABELS: [&str; 3] = ["version", "from", "to"];

/// Shared wire configuration.
///
/// Everything here must match between communicating peers and is exchanged
/// out of band, never negotiated on the wire. Mismatched configuration
/// (key, rounds, IV length) produces garbage plaintext on the receiving
/// side with no diagnostic at the cipher layer.
#[derive(Debug, Clone)]
pub struct WireConfig {
    /// Pre-shared symmetric key.
    pub key: Vec<u8>,
    /// Key-scheduling round count.
    pub rounds: u32,
    /// IV length in bytes.
    pub iv_length: usize,
    /// Protocol version string stamped on outgoing messages.
    pub version: String,
}

impl WireConfig {
    /// Configuration with the protocol defaults (200 rounds, 10-byte IV,
    /// version 0.2) and the given pre-shared key.
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            rounds: DEFAULT_ROUNDS,
            iv_length: DEFAULT_IV_LENGTH,
            version: PROTOCOL_VERSION.to_string(),
        }
    }
}

/// A TauNet message.
///
/// Immutable once constructed. Construct with [`TauNetMessage::outgoing`]
/// (build headers, then encrypt) or [`TauNetMessage::incoming`] (decrypt,
/// then parse); both populate every field or fail entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TauNetMessage {
    version: String,
    sender: String,
    recipient: String,
    body: String,
    cleartext: Vec<u8>,
    ciphertext: Vec<u8>,
}

impl TauNetMessage {
    /// Build a properly-formatted message addressed to `recipient` and
    /// encrypt it under `config` with the caller-supplied `iv`.
    ///
    /// The body is silently truncated to [`MAX_BODY`] bytes before
    /// encryption, backing off to a `char` boundary so the retained text
    /// stays valid UTF-8. The IV must be fresh per message; callers draw it
    /// from a cryptographically strong source.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::Crypto`] if the configured key is empty.
    pub fn outgoing(
        config: &WireConfig,
        sender: &str,
        recipient: &str,
        body: &str,
        iv: &[u8],
    ) -> Result<Self> {
        let body = truncate_to_char_boundary(body, MAX_BODY);

        let cleartext = format!(
            "version: {}\r\nfrom: {}\r\nto: {}\r\n\r\n{}",
            config.version, sender, recipient, body
        )
        .into_bytes();

        let ciphertext = encrypt(&cleartext, &config.key, config.rounds, iv)?;

        Ok(Self {
            version: config.version.clone(),
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            body: body.to_string(),
            cleartext,
            ciphertext,
        })
    }

    /// Read in received ciphertext: decrypt it under `config` and parse the
    /// header/body structure out of the cleartext.
    ///
    /// # Errors
    ///
    /// Any [`ProtocolError`]; a wrong key or tampered ciphertext typically
    /// surfaces as [`ProtocolError::HeaderCount`] or
    /// [`ProtocolError::InvalidUtf8`] since the garbage cleartext has no
    /// recognizable structure.
    pub fn incoming(config: &WireConfig, ciphertext: &[u8]) -> Result<Self> {
        let cleartext = decrypt(ciphertext, &config.key, config.rounds, config.iv_length)?;
        let (version, sender, recipient, body) = parse_headers(&cleartext)?;

        Ok(Self {
            version,
            sender,
            recipient,
            body,
            cleartext,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Protocol version stamped in the message headers.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Sender name (the `from` header).
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Recipient name (the `to` header).
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Message body; empty bodies mark liveness probes.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Encrypted wire image, IV prefix included. Ready to be sent.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Decrypted header/body bytes.
    pub fn cleartext(&self) -> &[u8] {
        &self.cleartext
    }
}

/// Truncate `body` to at most `max` bytes without splitting a `char`.
fn truncate_to_char_boundary(body: &str, max: usize) -> &str {
    if body.len() <= max {
        return body;
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// Parse the three fixed-order headers and the body out of cleartext.
///
/// Either fully succeeds or fails with the first violation encountered;
/// the offending header is named where there is one.
fn parse_headers(cleartext: &[u8]) -> Result<(String, String, String, String)> {
    let [version_label, from_label, to_label] = HEADER_LABELS;

    let (line, rest) = split_line(cleartext).ok_or(ProtocolError::HeaderCount)?;
    let version = header_value(line, version_label)?;

    let (line, rest) = split_line(rest).ok_or(ProtocolError::HeaderCount)?;
    let sender = header_value(line, from_label)?;

    let (line, rest) = split_line(rest).ok_or(ProtocolError::HeaderCount)?;
    let recipient = header_value(line, to_label)?;

    let body = rest.strip_prefix(b"\r\n").ok_or(ProtocolError::MissingBlankLine)?;
    let body = std::str::from_utf8(body).map_err(|_| ProtocolError::InvalidUtf8)?;

    Ok((version, sender, recipient, body.to_string()))
}

/// Split off everything before the first line terminator.
fn split_line(bytes: &[u8]) -> Option<(&[u8], &[u8])> {
    let pos = bytes.windows(2).position(|pair| pair == b"\r\n")?;
    Some((&bytes[..pos], &bytes[pos + 2..]))
}

/// Extract a header's value, requiring the `label: ` prefix and a
/// non-empty remainder.
fn header_value(line: &[u8], label: &'static str) -> Result<String> {
    let value = line
        .strip_prefix(label.as_bytes())
        .and_then(|rest| rest.strip_prefix(b": "))
        .ok_or(ProtocolError::HeaderFormat { header: label })?;

    if value.is_empty() {
        return Err(ProtocolError::EmptyHeader { header: label });
    }

    let value = std::str::from_utf8(value).map_err(|_| ProtocolError::InvalidUtf8)?;
    Ok(value.to_string())
}
