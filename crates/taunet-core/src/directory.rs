//! The user directory: the closed set of known peers.
//!
//! Loaded once at startup from a `name,host[,port]` CSV file and passed
//! explicitly to whichever component needs lookups (validator, sender) -
//! never ambient state. A load failure is a configuration error and fatal:
//! a node with no directory cannot authorize anything.

use std::{collections::HashMap, io, path::Path};

use taunet_proto::DEFAULT_PORT;
use thiserror::Error;

/// Errors raised while loading the user directory.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// The directory file could not be read.
    #[error("cannot read user directory '{path}': {source}")]
    Io {
        /// Path that failed to load.
        path: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// A row did not have the `name,host[,port]` shape.
    #[error("malformed user directory row {line_number}: '{row}'")]
    MalformedRow {
        /// 1-based line number of the offending row.
        line_number: usize,
        /// The row as read.
        row: String,
    },

    /// A row's port column was not a valid port number.
    #[error("invalid port in user directory row {line_number}: '{value}'")]
    InvalidPort {
        /// 1-based line number of the offending row.
        line_number: usize,
        /// The value that failed to parse.
        value: String,
    },
}

/// A single known peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// User name, the value of `from`/`to` headers.
    pub name: String,
    /// Host the user's daemon runs on (name or IP literal).
    pub host: String,
    /// TCP port the user's daemon listens on.
    pub port: u16,
    /// Transient liveness flag, set by out-of-band probes. Never persisted.
    pub online: bool,
}

impl User {
    /// A user on the default TauNet port.
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self { name: name.into(), host: host.into(), port: DEFAULT_PORT, online: false }
    }
}

/// The list of valid users whom messages can be sent to and received from.
#[derive(Debug, Clone, Default)]
pub struct UserTable {
    users: Vec<User>,
    by_name: HashMap<String, usize>,
    by_host: HashMap<String, usize>,
}

impl UserTable {
    /// Build a table from already-constructed users (primarily for tests
    /// and simulation).
    pub fn from_users(users: impl IntoIterator<Item = User>) -> Self {
        let mut table = Self::default();
        for user in users {
            table.insert(user);
        }
        table
    }

    /// Parse directory rows from CSV text: `name,host[,port]` per line,
    /// blank lines skipped, port defaulting to 6283.
    ///
    /// # Errors
    ///
    /// [`DirectoryError::MalformedRow`] / [`DirectoryError::InvalidPort`]
    /// on the first bad row; the whole load fails rather than running with
    /// a partial directory.
    pub fn parse(text: &str) -> Result<Self, DirectoryError> {
        let mut table = Self::default();

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let line_number = index + 1;

            let mut columns = line.split(',').map(str::trim);
            let (Some(name), Some(host)) = (columns.next(), columns.next()) else {
                return Err(DirectoryError::MalformedRow {
                    line_number,
                    row: line.to_string(),
                });
            };
            if name.is_empty() || host.is_empty() {
                return Err(DirectoryError::MalformedRow {
                    line_number,
                    row: line.to_string(),
                });
            }

            let port = match columns.next() {
                None | Some("") => DEFAULT_PORT,
                Some(value) => value.parse().map_err(|_| DirectoryError::InvalidPort {
                    line_number,
                    value: value.to_string(),
                })?,
            };

            table.insert(User {
                name: name.to_string(),
                host: host.to_string(),
                port,
                online: false,
            });
        }

        Ok(table)
    }

    /// Load and parse the directory file at `path`.
    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let text = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Look up a user by name.
    pub fn by_name(&self, name: &str) -> Option<&User> {
        self.by_name.get(name).map(|&index| &self.users[index])
    }

    /// Look up a user by host.
    pub fn by_host(&self, host: &str) -> Option<&User> {
        self.by_host.get(host).map(|&index| &self.users[index])
    }

    /// All users, sorted case-insensitively by name.
    pub fn all(&self) -> Vec<&User> {
        let mut users: Vec<&User> = self.users.iter().collect();
        users.sort_by_key(|user| user.name.to_lowercase());
        users
    }

    /// Number of users in the table.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Update a user's transient online flag. Returns false if the name is
    /// unknown.
    pub fn set_online(&mut self, name: &str, online: bool) -> bool {
        match self.by_name.get(name) {
            Some(&index) => {
                self.users[index].online = online;
                true
            }
            None => false,
        }
    }

    /// Insert a user, replacing any existing entry with the same name.
    fn insert(&mut self, user: User) {
        let index = match self.by_name.get(&user.name) {
            Some(&existing) => {
                self.users[existing] = user.clone();
                existing
            }
            None => {
                self.users.push(user.clone());
                self.users.len() - 1
            }
        };
        self.by_name.insert(user.name, index);
        self.by_host.insert(user.host, index);
    }
}
