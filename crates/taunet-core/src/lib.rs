//! TauNet node logic.
//!
//! Everything a TauNet node needs between the message codec and the
//! sockets: the environment capability for randomness, the user directory,
//! message storage, and the daemon-side connection validator.
//!
//! # Architecture
//!
//! The validator is sans-IO: [`validator::validate`] is a pure function
//! over received bytes, the peer address, and injected capabilities
//! (directory lookup, host resolution). The server and sender crates
//! provide the production glue around it. This keeps every acceptance gate
//! unit-testable without opening a socket.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod directory;
pub mod env;
pub mod storage;
pub mod validator;

pub use directory::{DirectoryError, User, UserTable};
pub use env::{Environment, SystemEnv};
pub use storage::{ConversationStore, MemoryStorage, Storage, StorageError};
pub use validator::{HostResolver, Rejection, SystemResolver, ValidatorConfig, validate};
