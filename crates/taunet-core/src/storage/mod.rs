//! Storage abstraction for validated messages.
//!
//! Trait-based abstraction over conversation persistence. The trait is
//! synchronous: the daemon is single-threaded and writes one line per
//! accepted message, so there is nothing to overlap. Implementations are
//! `Clone` and share internal state, letting tests keep a handle on the
//! store they handed to a running server.

mod conversation;
mod error;
mod memory;

pub use conversation::ConversationStore;
pub use error::StorageError;
pub use memory::MemoryStorage;
use taunet_proto::TauNetMessage;

/// Persistence for fully validated messages.
///
/// `conversation` is the name of the non-local party: the sender for
/// inbound messages, the recipient for outbound ones.
pub trait Storage: Clone + Send + Sync + 'static {
    /// Append a message to the named conversation.
    ///
    /// Returns a location identifier for the stored message (a file path,
    /// an in-memory slot, ...). Called only for messages that passed every
    /// validation gate - storage never sees rejected input.
    fn persist(&self, conversation: &str, message: &TauNetMessage)
    -> Result<String, StorageError>;

    /// Names of all conversations available for viewing, sorted.
    fn conversations(&self) -> Result<Vec<String>, StorageError>;
}
