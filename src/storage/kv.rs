//! Synchronous, local key-value storage.
//!
//! The learning-path collection lives under a single key of a
//! [`KeyValueStore`]. [`FileStore`] keeps each key in its own JSON file under a
//! root directory; [`MemoryStore`] keeps everything in memory and can enforce a
//! byte quota.

use std::{
    cell::RefCell,
    collections::HashMap,
    io,
    path::{Path, PathBuf},
};

/// A synchronous string key-value store.
///
/// Implementations are single-threaded: every call runs to completion before
/// the next one starts.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is unavailable or full. The previous
    /// value is left untouched in that case.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The storage could not be read or written.
    #[error("storage unavailable: {0}")]
    Unavailable(#[from] io::Error),
    /// Writing the value would exceed the storage quota.
    #[error("storage quota exceeded writing '{key}': {required} bytes needed, {quota} allowed")]
    QuotaExceeded {
        /// The key being written.
        key: String,
        /// Total bytes the store would hold after the write.
        required: usize,
        /// The store's quota in bytes.
        quota: usize,
    },
    /// The key cannot be used by this store.
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
    /// The collection could not be serialized.
    #[error("failed to encode stored value: {0}")]
    Encode(#[from] serde_json::Error),
    /// A learning path has a rating that JSON cannot represent.
    #[error("learning path '{id}' has a non-finite rating ({rating})")]
    NonFiniteRating {
        /// Id of the offending learning path.
        id: String,
        /// The rejected rating.
        rating: f64,
    },
}

/// A store that keeps each key in `<root>/<key>.json`.
///
/// Writes go to a temporary file that is then renamed over the target, so a
/// value is never observed half-written.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at the given directory.
    ///
    /// The directory is created on first write.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The directory values are stored in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file a key is stored in.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or would escape the root
    /// directory.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // Invalid UTF-8 is a malformed value, not an unavailable store.
        let value = String::from_utf8(bytes).unwrap_or_else(|e| {
            tracing::warn!("{} is not valid UTF-8: {e}", path.display());
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        });
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.root)?;

        let staging = path.with_extension("json.tmp");
        std::fs::write(&staging, value)?;
        if let Err(e) = std::fs::rename(&staging, &path) {
            if let Err(cleanup) = std::fs::remove_file(&staging) {
                tracing::debug!("failed to remove {}: {cleanup}", staging.display());
            }
            return Err(e.into());
        }

        tracing::trace!("wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

/// An in-memory store, optionally limited to a number of bytes.
///
/// Useful as a test double and for modelling a full or disabled storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// An empty, unlimited store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty store holding at most `quota` bytes of keys and values.
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: RefCell::default(),
            quota: Some(quota),
        }
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let required = self.used_bytes_without(key) + key.len() + value.len();
            if required > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    required,
                    quota,
                });
            }
        }

        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
