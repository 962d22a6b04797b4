/// Synchronous key-value storage backends.
pub mod kv;
/// The persisted learning-path collection.
pub mod collection;
/// CRUD over the collection, keyed by path id.
pub mod repository;

pub use collection::PathStore;
pub use kv::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use repository::{PathRepository, Repository};
