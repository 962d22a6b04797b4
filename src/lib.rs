//! Learning-path curation
//!
//! Learning paths are curated, ordered collections of resources. The whole
//! collection is kept as one JSON array in a local key-value store.

pub mod domain;
pub use domain::{
    Config, Difficulty, LearningPath, LinkedPathPreview, MediaKind, PathDraft, PathId, PathLink,
    Resource, ResourceKind, ResourceTarget,
};

/// Key-value storage, the persistent path collection and the repository.
pub mod storage;
pub use storage::{FileStore, KeyValueStore, MemoryStore, PathRepository, Repository};

pub mod query;
pub use query::{Query, SortKey};

pub mod linking;
pub use linking::{LinkError, LinkState, RefreshResult, StalePreview};

pub mod auth;
pub mod media;
