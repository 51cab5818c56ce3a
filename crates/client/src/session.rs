//! Client-held cart session token.
//!
//! The server partitions carts by an opaque session id. The client generates
//! one on first use, keeps it in a [`SessionStorage`] under
//! [`SESSION_STORAGE_KEY`], and sends it with every cart request so the same
//! cart follows the user across runs.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use rand::Rng;
use rand::distr::Alphanumeric;
use thiserror::Error;

use verdant_core::{IdError, SessionId};

/// Key the session token is stored under.
pub const SESSION_STORAGE_KEY: &str = "verdant.cart.session";

/// Length of freshly generated session tokens.
pub const GENERATED_TOKEN_LENGTH: usize = 32;

/// File name used by [`FileStorage`] inside its state directory.
const STATE_FILE_NAME: &str = "session.json";

/// Errors from reading or writing session storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Corrupt session state in {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Session storage lock poisoned")]
    Poisoned,

    #[error("Generated session token is invalid: {0}")]
    InvalidToken(#[from] IdError),
}

impl<T> From<PoisonError<T>> for StorageError {
    fn from(_: PoisonError<T>) -> Self {
        Self::Poisoned
    }
}

/// Key-value storage for client state, analogous to browser local storage.
pub trait SessionStorage {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Per-process storage; the token is gone when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .lock()?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.lock()?.remove(key);
        Ok(())
    }
}

/// Storage backed by a JSON object file in a state directory.
///
/// Every instance pointing at the same directory sees the same values, so a
/// CLI invoked repeatedly from one shell keeps using one cart.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Store state in `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(STATE_FILE_NAME),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&contents).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(values).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        // Write then rename so a reader never sees a half-written file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

/// Hands out the client's session id, generating and persisting one on first
/// use.
#[derive(Debug)]
pub struct SessionProvider<S> {
    storage: S,
}

impl<S: SessionStorage> SessionProvider<S> {
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The stored session id, or a freshly generated and stored one.
    ///
    /// A stored value that is not a valid session id is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or written.
    pub fn session_id(&self) -> Result<SessionId, StorageError> {
        if let Some(raw) = self.storage.get(SESSION_STORAGE_KEY)? {
            match SessionId::parse(&raw) {
                Ok(session) => return Ok(session),
                Err(e) => tracing::warn!(error = %e, "Replacing invalid stored session id"),
            }
        }

        let session = SessionId::parse(&generate_token())?;
        self.storage.set(SESSION_STORAGE_KEY, session.as_str())?;
        tracing::debug!(session = %session, "Generated new session id");
        Ok(session)
    }

    /// Forget the stored session id; the next call to
    /// [`session_id`](Self::session_id) starts a new cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be written.
    pub fn reset(&self) -> Result<(), StorageError> {
        self.storage.remove(SESSION_STORAGE_KEY)
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }
}

/// A random URL-safe token of [`GENERATED_TOKEN_LENGTH`] alphanumerics.
#[must_use]
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(GENERATED_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
