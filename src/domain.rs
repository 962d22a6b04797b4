//! Domain models for learning-path curation.
//!
//! This module contains the core domain types: learning paths, their
//! resources, the authoring draft and the configuration.

/// Learning path domain model.
pub mod learning_path;
pub use learning_path::{Difficulty, InvalidDifficulty, LearningPath, PathId};

/// Resources within a learning path.
pub mod resource;
pub use resource::{
    LinkedPathPreview, MediaKind, PathLink, Resource, ResourceKind, ResourceTarget,
    UnknownResourceKind,
};

mod draft;
pub use draft::PathDraft;

mod config;
pub use config::Config;

pub(crate) mod seed;
