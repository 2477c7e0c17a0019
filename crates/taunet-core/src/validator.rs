//! The connection validator: the ordered gate chain every inbound byte
//! stream must pass before a message reaches storage.
//!
//! The chain is sans-IO - [`validate`] sees only the received bytes, the
//! peer address, and injected capabilities - so every gate is testable
//! without a socket. Gates run in strict order and short-circuit:
//!
//! 1. decrypt + parse (malformed input is dropped),
//! 2. zero-length body (a liveness probe, not an error),
//! 3. recipient must be this node's own identity,
//! 4. sender must exist in the user directory,
//! 5. the sender's directory host must resolve to the actual peer address
//!    (a known name asserted from an unauthorized host is spoofing),
//! 6. version drift is warned about but accepted.
//!
//! No rejection is ever reported to the remote peer: the protocol is
//! fire-and-forget, with no acknowledgement or NACK.

use std::net::IpAddr;

use taunet_proto::{ProtocolError, TauNetMessage, WireConfig};
use thiserror::Error;

use crate::directory::UserTable;

/// Resolution of a directory host to a network address.
///
/// Injected so the anti-spoofing gate can be exercised with a stub; the
/// production impl is [`SystemResolver`].
pub trait HostResolver {
    /// Resolve `host:port` to an IP address, `None` if resolution fails.
    fn resolve(&self, host: &str, port: u16) -> Option<IpAddr>;
}

/// Production resolver using the system's name resolution.
#[derive(Debug, Clone, Default)]
pub struct SystemResolver;

impl HostResolver for SystemResolver {
    fn resolve(&self, host: &str, port: u16) -> Option<IpAddr> {
        use std::net::ToSocketAddrs;

        (host, port)
            .to_socket_addrs()
            .ok()?
            .next()
            .map(|address| address.ip())
    }
}

/// Node-local configuration the validator checks messages against.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// This node's own user name; messages addressed elsewhere are dropped.
    pub username: String,
    /// Shared wire configuration (key, rounds, IV length, version).
    pub wire: WireConfig,
}

/// Why an inbound connection's payload was dropped.
///
/// Malformed input and failed authorization are deliberately handled
/// identically - drop and log - and never distinguished to the peer.
#[derive(Error, Debug)]
pub enum Rejection {
    /// The payload failed to decrypt into a well-formed message.
    #[error("malformed message: {0}")]
    Malformed(#[from] ProtocolError),

    /// Zero-length body: a liveness probe, logged low and dropped.
    #[error("liveness probe from '{sender}'")]
    Probe {
        /// Claimed sender of the probe.
        sender: String,
    },

    /// The message was addressed to someone other than this node.
    #[error("message for '{recipient}' is not for us")]
    WrongRecipient {
        /// The recipient the message named.
        recipient: String,
    },

    /// The claimed sender is not in the user directory.
    #[error("unknown sender '{sender}'")]
    UnknownSender {
        /// The name the message claimed.
        sender: String,
    },

    /// The claimed sender's directory host does not resolve to the peer
    /// that actually connected.
    #[error("sender '{sender}' connected from unauthorized host {peer}")]
    HostMismatch {
        /// The name the message claimed.
        sender: String,
        /// Address the connection actually came from.
        peer: IpAddr,
    },
}

impl Rejection {
    /// Whether this rejection is routine enough to log below warning
    /// level. Probes are expected traffic, not protocol violations.
    pub fn is_probe(&self) -> bool {
        matches!(self, Self::Probe { .. })
    }
}

/// Run the full gate chain over one connection's received bytes.
///
/// On success the fully validated message is returned for persistence.
/// A version mismatch alone does not reject: it is logged as a warning and
/// the message is accepted, deliberately tolerating version drift between
/// peers.
///
/// # Errors
///
/// The first failing gate's [`Rejection`].
pub fn validate<R: HostResolver>(
    data: &[u8],
    peer: IpAddr,
    directory: &UserTable,
    resolver: &R,
    config: &ValidatorConfig,
) -> Result<TauNetMessage, Rejection> {
    let message = TauNetMessage::incoming(&config.wire, data)?;

    if message.body().is_empty() {
        return Err(Rejection::Probe { sender: message.sender().to_string() });
    }

    if message.recipient() != config.username {
        return Err(Rejection::WrongRecipient {
            recipient: message.recipient().to_string(),
        });
    }

    let Some(user) = directory.by_name(message.sender()) else {
        return Err(Rejection::UnknownSender { sender: message.sender().to_string() });
    };

    if resolver.resolve(&user.host, user.port) != Some(peer) {
        return Err(Rejection::HostMismatch {
            sender: message.sender().to_string(),
            peer,
        });
    }

    if message.version() != config.wire.version {
        tracing::warn!(
            remote = message.version(),
            local = config.wire.version.as_str(),
            sender = message.sender(),
            "protocol version mismatch, accepting anyway"
        );
    }

    Ok(message)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::net::{IpAddr, Ipv4Addr};

    use taunet_crypto::encrypt;
    use taunet_proto::WireConfig;

    use super::*;
    use crate::directory::{User, UserTable};

    /// Resolver over a fixed host map.
    struct StubResolver(HashMap<&'static str, IpAddr>);

    impl HostResolver for StubResolver {
        fn resolve(&self, host: &str, _port: u16) -> Option<IpAddr> {
            self.0.get(host).copied()
        }
    }

    const ALICE_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 3));
    const OTHER_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 50));

    fn fixture() -> (UserTable, StubResolver, ValidatorConfig) {
        let directory = UserTable::from_users([
            User::new("alice", "alice.example.com"),
            User::new("bob", "bob.example.com"),
        ]);
        let resolver =
            StubResolver(HashMap::from([("alice.example.com", ALICE_ADDR)]));
        let config = ValidatorConfig {
            username: "me".to_string(),
            wire: WireConfig::new(b"password".as_slice()),
        };
        (directory, resolver, config)
    }

    fn wire_from(config: &ValidatorConfig, sender: &str, recipient: &str, body: &str) -> Vec<u8> {
        TauNetMessage::outgoing(&config.wire, sender, recipient, body, &[7u8; 10])
            .unwrap()
            .ciphertext()
            .to_vec()
    }

    #[test]
    fn valid_message_passes_every_gate() {
        let (directory, resolver, config) = fixture();
        let wire = wire_from(&config, "alice", "me", "hello");

        let message = validate(&wire, ALICE_ADDR, &directory, &resolver, &config).unwrap();
        assert_eq!(message.sender(), "alice");
        assert_eq!(message.body(), "hello");
    }

    #[test]
    fn garbage_bytes_are_malformed() {
        let (directory, resolver, config) = fixture();

        let result = validate(&[0xAB; 64], ALICE_ADDR, &directory, &resolver, &config);
        assert!(matches!(result, Err(Rejection::Malformed(_))));
    }

    #[test]
    fn wrong_key_is_malformed() {
        let (directory, resolver, config) = fixture();
        let mut other = config.clone();
        other.wire.key = b"different password".to_vec();
        let wire = wire_from(&other, "alice", "me", "hello");

        let result = validate(&wire, ALICE_ADDR, &directory, &resolver, &config);
        assert!(matches!(result, Err(Rejection::Malformed(_))));
    }

    #[test]
    fn empty_body_is_a_probe_not_an_error() {
        let (directory, resolver, config) = fixture();
        let wire = wire_from(&config, "alice", "me", "");

        let result = validate(&wire, ALICE_ADDR, &directory, &resolver, &config);
        match result {
            Err(rejection @ Rejection::Probe { .. }) => {
                assert!(rejection.is_probe());
            }
            other => panic!("expected probe rejection, got {other:?}"),
        }
    }

    #[test]
    fn wrong_recipient_is_dropped() {
        let (directory, resolver, config) = fixture();
        let wire = wire_from(&config, "alice", "somebody-else", "hello");

        let result = validate(&wire, ALICE_ADDR, &directory, &resolver, &config);
        assert!(matches!(
            result,
            Err(Rejection::WrongRecipient { recipient }) if recipient == "somebody-else"
        ));
    }

    #[test]
    fn unknown_sender_is_dropped() {
        let (directory, resolver, config) = fixture();
        let wire = wire_from(&config, "mallory", "me", "hello");

        let result = validate(&wire, ALICE_ADDR, &directory, &resolver, &config);
        assert!(matches!(
            result,
            Err(Rejection::UnknownSender { sender }) if sender == "mallory"
        ));
    }

    #[test]
    fn spoofed_host_is_dropped() {
        let (directory, resolver, config) = fixture();
        let wire = wire_from(&config, "alice", "me", "hello");

        // Right name, wrong origin address.
        let result = validate(&wire, OTHER_ADDR, &directory, &resolver, &config);
        assert!(matches!(result, Err(Rejection::HostMismatch { .. })));
    }

    #[test]
    fn unresolvable_directory_host_is_dropped() {
        let (directory, resolver, config) = fixture();
        // bob is in the directory but the stub cannot resolve his host.
        let wire = wire_from(&config, "bob", "me", "hello");

        let result = validate(&wire, OTHER_ADDR, &directory, &resolver, &config);
        assert!(matches!(result, Err(Rejection::HostMismatch { .. })));
    }

    #[test]
    fn version_drift_is_accepted() {
        let (directory, resolver, config) = fixture();

        // Hand-seal a cleartext with an older version stamp; `outgoing`
        // always writes the local version.
        let cleartext = b"version: 0.1\r\nfrom: alice\r\nto: me\r\n\r\nstill here";
        let wire = encrypt(cleartext, &config.wire.key, config.wire.rounds, &[9u8; 10]).unwrap();

        let message = validate(&wire, ALICE_ADDR, &directory, &resolver, &config).unwrap();
        assert_eq!(message.version(), "0.1");
        assert_eq!(message.body(), "still here");
    }

    #[test]
    fn gate_order_probe_before_recipient() {
        let (directory, resolver, config) = fixture();
        // Empty body addressed to somebody else: the probe gate fires
        // first.
        let wire = wire_from(&config, "alice", "somebody-else", "");

        let result = validate(&wire, ALICE_ADDR, &directory, &resolver, &config);
        assert!(matches!(result, Err(Rejection::Probe { .. })));
    }
}
