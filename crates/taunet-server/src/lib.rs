//! TauNet listening daemon.
//!
//! Production glue around [`taunet_core`]'s sans-IO validator: a TCP
//! listener bound on all interfaces, accepting one connection at a time and
//! running every inbound byte stream through the acceptance gate chain
//! before handing it to storage.
//!
//! # Concurrency model
//!
//! Fully sequential by design: one connection is accepted, read, and
//! completely processed before the next accept is issued. The accept call
//! blocks indefinitely ("wait for a peer"); the data read on an accepted
//! connection is bounded by a short timeout so a silent peer cannot stall
//! the daemon. A timeout is not an error, merely an empty read. Nothing is
//! retried: a failed or rejected message is dropped and the daemon returns
//! to its accept state.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;

use std::{net::SocketAddr, time::Duration};

pub use error::ServerError;
use taunet_core::{Storage, SystemResolver, UserTable, ValidatorConfig, validate};
use taunet_proto::{BUF_SIZE, WireConfig};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to; an empty host means all interfaces.
    pub bind_address: String,
    /// This node's own user name.
    pub username: String,
    /// Shared wire configuration (key, rounds, IV length, version).
    pub wire: WireConfig,
    /// Receive timeout on an accepted connection.
    pub read_timeout: Duration,
}

impl ServerConfig {
    /// Configuration with protocol defaults: all interfaces on port 6283,
    /// 3-second receive timeout.
    pub fn new(username: impl Into<String>, key: impl Into<Vec<u8>>) -> Self {
        Self {
            bind_address: format!("0.0.0.0:{}", taunet_proto::DEFAULT_PORT),
            username: username.into(),
            wire: WireConfig::new(key),
            read_timeout: Duration::from_secs(3),
        }
    }
}

/// The TauNet daemon.
///
/// Owns the listening socket for its whole life; the socket is released
/// when [`Server::run`] returns, whether by interrupt or error.
pub struct Server<S: Storage> {
    listener: TcpListener,
    directory: UserTable,
    resolver: SystemResolver,
    storage: S,
    validator: ValidatorConfig,
    read_timeout: Duration,
}

impl<S: Storage> Server<S> {
    /// Validate the configuration and bind the listening socket.
    ///
    /// # Errors
    ///
    /// [`ServerError::Config`] for an empty username, empty key, or zero
    /// IV length - fatal, the daemon must refuse to run.
    /// [`ServerError::Transport`] if the bind fails.
    pub async fn bind(
        config: ServerConfig,
        directory: UserTable,
        storage: S,
    ) -> Result<Self, ServerError> {
        if config.username.is_empty() {
            return Err(ServerError::Config("username must not be empty".to_string()));
        }
        if config.wire.key.is_empty() {
            return Err(ServerError::Config("pre-shared key must not be empty".to_string()));
        }
        if config.wire.iv_length == 0 {
            return Err(ServerError::Config("IV length must be at least 1".to_string()));
        }

        let listener = TcpListener::bind(&config.bind_address).await?;
        tracing::info!("listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            directory,
            resolver: SystemResolver,
            storage,
            validator: ValidatorConfig { username: config.username, wire: config.wire },
            read_timeout: config.read_timeout,
        })
    }

    /// Local address the daemon is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the accept loop until interrupted.
    ///
    /// Each accepted connection is fully processed - read, validated,
    /// persisted or dropped - before the next accept. An accept error is
    /// logged and the loop continues; only the operator interrupt ends it.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("interrupted, closing listener");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => self.handle_connection(stream, peer).await,
                    Err(error) => tracing::error!("accept error: {error}"),
                }
            }
        }

        Ok(())
    }

    /// Process one inbound connection end to end.
    ///
    /// Never returns an error: every failure on this path is logged and
    /// the connection dropped, per the fire-and-forget protocol. The
    /// socket is shut down gracefully on every exit path.
    async fn handle_connection(&self, mut stream: TcpStream, peer: SocketAddr) {
        tracing::info!(%peer, "got a connection");

        let data = match read_wire_message(&mut stream, self.read_timeout).await {
            Ok(data) => data,
            Err(error) => {
                tracing::warn!(%peer, "read failed: {error}");
                close(stream).await;
                return;
            }
        };

        if data.is_empty() {
            tracing::info!(%peer, "connection sent no data before timing out");
            close(stream).await;
            return;
        }

        match validate(&data, peer.ip(), &self.directory, &self.resolver, &self.validator) {
            Ok(message) => match self.storage.persist(message.sender(), &message) {
                Ok(location) => {
                    tracing::info!(sender = message.sender(), %location, "message accepted");
                }
                Err(error) => tracing::error!("failed to persist message: {error}"),
            },
            Err(rejection) if rejection.is_probe() => tracing::debug!(%peer, "{rejection}"),
            Err(rejection) => tracing::warn!(%peer, "dropping message: {rejection}"),
        }

        close(stream).await;
    }
}

/// Read up to [`BUF_SIZE`] bytes from the connection, stopping at EOF, a
/// full buffer, or the receive timeout - whichever comes first.
///
/// A timeout is not an error: whatever arrived before it is returned, and
/// an empty result means the peer sent nothing in time.
async fn read_wire_message(
    stream: &mut TcpStream,
    timeout: Duration,
) -> std::io::Result<Vec<u8>> {
    let mut buffer = vec![0u8; BUF_SIZE];
    let mut filled = 0;

    let read_all = async {
        while filled < buffer.len() {
            let count = stream.read(&mut buffer[filled..]).await?;
            if count == 0 {
                break;
            }
            filled += count;
        }
        Ok::<(), std::io::Error>(())
    };

    match tokio::time::timeout(timeout, read_all).await {
        Ok(Ok(())) => {}
        Ok(Err(error)) => return Err(error),
        Err(_elapsed) => {}
    }

    buffer.truncate(filled);
    Ok(buffer)
}

/// Graceful shutdown, then close by drop. Shutdown failures are expected
/// when the peer already went away and are not worth reporting.
async fn close(mut stream: TcpStream) {
    let _ = stream.shutdown().await;
}
