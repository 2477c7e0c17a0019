//! TauNet outbound sender.
//!
//! One TCP connection per message: build, encrypt, connect, send,
//! shutdown, close. A short timeout bounds the connect and the send; a
//! failure is reported to the caller and logged, never retried. The
//! daemon sends nothing back - delivery is fire-and-forget.
//!
//! Liveness probing rides the same path: a zero-length body is the probe
//! marker, which the receiving daemon drops before any authorization
//! check.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;

use std::time::Duration;

pub use error::ClientError;
use taunet_core::{Environment, User, UserTable};
use taunet_proto::{TauNetMessage, WireConfig};
use tokio::{io::AsyncWriteExt, net::TcpStream, time::timeout};

/// Sender-side configuration.
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// Our own user name, stamped into the `from` header.
    pub username: String,
    /// Shared wire configuration (key, rounds, IV length, version).
    pub wire: WireConfig,
    /// Connect/send timeout.
    pub timeout: Duration,
}

impl SenderConfig {
    /// Configuration with protocol defaults and a 3-second timeout.
    pub fn new(username: impl Into<String>, key: impl Into<Vec<u8>>) -> Self {
        Self {
            username: username.into(),
            wire: WireConfig::new(key),
            timeout: Duration::from_secs(3),
        }
    }
}

/// Send one message to `user`, with a fresh IV drawn from `env`.
///
/// Returns the sent [`TauNetMessage`] so the caller can persist it under
/// the recipient's conversation.
///
/// # Errors
///
/// [`ClientError::Protocol`] if the message cannot be built,
/// [`ClientError::Transport`] / [`ClientError::Timeout`] if the peer
/// cannot be reached. Nothing is retried.
pub async fn send_message<E: Environment>(
    user: &User,
    body: &str,
    config: &SenderConfig,
    env: &E,
) -> Result<TauNetMessage, ClientError> {
    let iv = env.generate_iv(config.wire.iv_length);
    let message =
        TauNetMessage::outgoing(&config.wire, &config.username, &user.name, body, &iv)?;

    match transmit(user, message.ciphertext(), config.timeout).await {
        Ok(()) => {
            tracing::info!(
                recipient = user.name.as_str(),
                host = user.host.as_str(),
                "sent a message"
            );
            Ok(message)
        }
        Err(error) => {
            tracing::warn!(
                recipient = user.name.as_str(),
                host = user.host.as_str(),
                "send failed: {error}"
            );
            Err(error)
        }
    }
}

/// One connect/send/shutdown/close cycle, each phase bounded by `limit`.
async fn transmit(user: &User, wire: &[u8], limit: Duration) -> Result<(), ClientError> {
    let timed_out = || ClientError::Timeout { host: user.host.clone(), port: user.port };

    let address = format!("{}:{}", user.host, user.port);
    let mut stream = timeout(limit, TcpStream::connect(&address))
        .await
        .map_err(|_| timed_out())??;

    timeout(limit, stream.write_all(wire)).await.map_err(|_| timed_out())??;

    let _ = stream.shutdown().await;
    Ok(())
}

/// Probe `user`'s daemon for liveness.
///
/// Sends a zero-length-body message - the marker the daemon recognizes
/// and drops without treating it as an error. Reachability of the socket
/// and delivery of the probe count as "online"; any failure counts as
/// "offline".
pub async fn probe<E: Environment>(user: &User, config: &SenderConfig, env: &E) -> bool {
    match send_message(user, "", config, env).await {
        Ok(_) => true,
        Err(error) => {
            tracing::debug!(user = user.name.as_str(), "probe failed: {error}");
            false
        }
    }
}

/// Probe every user in the directory and update their transient online
/// flags in place.
pub async fn probe_all<E: Environment>(
    directory: &mut UserTable,
    config: &SenderConfig,
    env: &E,
) {
    let names: Vec<String> =
        directory.all().iter().map(|user| user.name.clone()).collect();

    for name in names {
        let Some(user) = directory.by_name(&name).cloned() else {
            continue;
        };
        let online = probe(&user, config, env).await;
        directory.set_online(&name, online);
    }
}
