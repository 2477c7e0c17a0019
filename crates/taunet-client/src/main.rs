//! TauNet sender binary.
//!
//! # Usage
//!
//! ```bash
//! taunet-send --username relsqui --key "correct horse" \
//!     --to alice --message "lunch?"
//! ```
//!
//! The recipient is looked up in `users.csv` under the base directory, and
//! the sent message is appended to that recipient's conversation file.

use std::path::PathBuf;

use clap::Parser;
use taunet_client::{SenderConfig, send_message};
use taunet_core::{ConversationStore, Storage, SystemEnv, UserTable};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// TauNet message sender
#[derive(Parser, Debug)]
#[command(name = "taunet-send")]
#[command(about = "Send one encrypted TauNet message")]
#[command(version)]
struct Args {
    /// Recipient user name (must exist in the user directory)
    #[arg(short, long)]
    to: String,

    /// Message body
    #[arg(short, long)]
    message: String,

    /// Our own user name
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

    let base_dir = match args.base_dir {
        Some(dir) => dir,
        None => std::env::home_dir()
            .map(|home| home.join(".taunet"))
            .ok_or("no home directory; pass --base-dir explicitly")?,
    };

    let directory = UserTable::load(&base_dir.join("users.csv"))?;
    let storage = ConversationStore::open(base_dir.join("messages"))?;

    let recipient = directory
        .by_name(&args.to)
        .ok_or_else(|| format!("no user named '{}' in the directory", args.to))?;

    let mut config = SenderConfig::new(args.username, args.key.into_bytes());
    config.wire.rounds = args.rounds;
    config.wire.iv_length = args.iv_length;

    let message = send_message(recipient, &args.message, &config, &SystemEnv::new()).await?;

    let location = storage.persist(&recipient.name, &message)?;
    tracing::info!(location, "conversation updated");

    Ok(())
}
