//! TauNet daemon binary.
//!
//! # Usage
//!
//! ```bash
//! # Listen on the default port with the base directory ~/.taunet
//! taunetd --username relsqui --key "correct horse"
//!
//! # Explicit layout and verbose logging
//! taunetd --username relsqui --key "correct horse" \
//!     --base-dir /var/lib/taunet --bind 0.0.0.0:6283 --log-level debug
//! ```
//!
//! The base directory must already contain `users.csv` (the user
//! directory) and a `messages/` subdirectory; the daemon refuses to start
//! otherwise.

use std::path::PathBuf;

use clap::Parser;
use taunet_core::{ConversationStore, UserTable};
use taunet_server::{Server, ServerConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// TauNet listening daemon
#[derive(Parser, Debug)]
#[command(name = "taunetd")]
#[command(about = "TauNet encrypted messaging daemon")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:6283")]
    bind: String,

    /// This node's own user name
    #[arg(short, long)]
    username: String,

    /// Pre-shared symmetric key
    #[arg(short, long)]
    key: String,

    /// Base directory holding users.csv and messages/
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Key-scheduling round count
    #[arg(long, default_value_t = 200)]
    rounds: u32,

    /// IV length in bytes
    #[arg(long, default_value_t = 10)]
    iv_length: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("TauNet daemon starting");

    let base_dir = match args.base_dir {
        Some(dir) => dir,
        None => std::env::home_dir()
            .map(|home| home.join(".taunet"))
            .ok_or("no home directory; pass --base-dir explicitly")?,
    };

    let directory = UserTable::load(&base_dir.join("users.csv"))?;
    tracing::info!("loaded {} users from {}", directory.len(), base_dir.display());

    let storage = ConversationStore::open(base_dir.join("messages"))?;

    let mut config = ServerConfig::new(args.username, args.key.into_bytes());
    config.bind_address = args.bind;
    config.wire.rounds = args.rounds;
    config.wire.iv_length = args.iv_length;

    let server = Server::bind(config, directory, storage).await?;

    server.run().await?;

    Ok(())
}
