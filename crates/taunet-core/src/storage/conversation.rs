//! File-backed conversation store.
//!
//! One append-only text file per conversation under the message directory,
//! one `[{time}] {sender}: {body}` line per message. The format is meant
//! to be readable as-is with a pager; nothing ever rewrites an existing
//! line.

use std::{fs::OpenOptions, io::Write, path::PathBuf};

use taunet_proto::TauNetMessage;

use super::{Storage, StorageError};

/// Conversation files under a message directory.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    dir: PathBuf,
}

impl ConversationStore {
    /// Open the store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// [`StorageError::MissingDirectory`] if `dir` does not exist - a
    /// missing message directory is a configuration error and the caller
    /// must refuse to run.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(StorageError::MissingDirectory { path: dir });
        }
        Ok(Self { dir })
    }

    /// Path of the file backing `conversation`.
    pub fn conversation_path(&self, conversation: &str) -> PathBuf {
        self.dir.join(conversation)
    }
}

impl Storage for ConversationStore {
    fn persist(
        &self,
        conversation: &str,
        message: &TauNetMessage,
    ) -> Result<String, StorageError> {
        let path = self.conversation_path(conversation);
        let line = format!(
            "[{}] {}: {}\n",
            chrono::Local::now().format("%c"),
            message.sender(),
            message.body()
        );

        let io_error = |source| StorageError::Io { path: path.clone(), source };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_error)?;
        file.write_all(line.as_bytes()).map_err(io_error)?;

        Ok(path.display().to_string())
    }

    fn conversations(&self) -> Result<Vec<String>, StorageError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StorageError::Io {
                path: self.dir.clone(),
                source,
            })?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}
