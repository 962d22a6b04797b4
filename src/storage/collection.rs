//! The persisted learning-path collection.
//!
//! The whole collection is one JSON array stored under a single key. Reads
//! decode defensively: a missing or malformed value reads as an empty
//! collection, a malformed record is skipped, and the next successful write
//! replaces the stored value.

use crate::{
    domain::{seed, Config, LearningPath},
    storage::kv::{KeyValueStore, StorageError},
};

/// Owner of the canonical learning-path collection.
#[derive(Debug)]
pub struct PathStore<S> {
    store: S,
    key: String,
    seed: Vec<LearningPath>,
}

impl<S: KeyValueStore> PathStore<S> {
    /// Wrap a key-value store using the given configuration.
    ///
    /// When `seed_sample_data` is set, the sample learning paths are written
    /// on first use; otherwise first use writes an empty collection.
    #[must_use]
    pub fn new(store: S, config: &Config) -> Self {
        let seed = if config.seed_sample_data {
            seed::sample_paths()
        } else {
            Vec::new()
        };
        Self::with_seed(store, config.storage_key(), seed)
    }

    /// Wrap a key-value store with an explicit key and seed collection.
    #[must_use]
    pub fn with_seed(store: S, key: impl Into<String>, seed: Vec<LearningPath>) -> Self {
        Self {
            store,
            key: key.into(),
            seed,
        }
    }

    /// The key the collection is stored under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying key-value store.
    #[must_use]
    pub const fn backend(&self) -> &S {
        &self.store
    }

    /// Write the seed collection if nothing is stored yet.
    ///
    /// Safe to call before every read.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or written.
    pub fn initialize(&self) -> Result<(), StorageError> {
        if self.store.get(&self.key)?.is_none() {
            tracing::info!(
                "seeding '{}' with {} learning paths",
                self.key,
                self.seed.len()
            );
            self.write(&self.seed)?;
        }
        Ok(())
    }

    /// Read the full collection.
    ///
    /// A missing value or one that is not a JSON array reads as an empty
    /// collection. Records that fail to decode are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage itself cannot be read.
    pub fn get_all(&self) -> Result<Vec<LearningPath>, StorageError> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(Vec::new());
        };

        let records: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("stored learning paths under '{}' are malformed: {e}", self.key);
                return Ok(Vec::new());
            }
        };

        let paths = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| {
                serde_json::from_value(record)
                    .inspect_err(|e| {
                        tracing::warn!(
                            "skipping malformed learning path {index} under '{}': {e}",
                            self.key
                        );
                    })
                    .ok()
            })
            .collect();
        Ok(paths)
    }

    /// Overwrite the stored collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be encoded or the storage is
    /// unavailable or full. A non-finite rating is rejected before anything
    /// is written.
    pub fn replace_all(&self, paths: &[LearningPath]) -> Result<(), StorageError> {
        self.write(paths)
    }

    fn write(&self, paths: &[LearningPath]) -> Result<(), StorageError> {
        // serde_json encodes NaN and infinity as null, which cannot be read back.
        if let Some(path) = paths.iter().find(|path| !path.rating.is_finite()) {
            return Err(StorageError::NonFiniteRating {
                id: path.id.to_string(),
                rating: path.rating,
            });
        }

        let encoded = serde_json::to_string(paths)?;
        self.store.set(&self.key, &encoded)?;
        tracing::debug!("stored {} learning paths under '{}'", paths.len(), self.key);
        Ok(())
    }
}
