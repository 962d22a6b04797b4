use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Resource;

/// The opaque, unique identifier of a learning path.
///
/// Authoring generates these from a millisecond timestamp, but any string is
/// accepted. Serialized as a plain string.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathId(String);

impl PathId {
    /// Wraps a string as a path identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is the empty string.
    ///
    /// An empty target id is how an unset path link is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PathId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for PathId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for PathId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for PathId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PathId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// How demanding a learning path is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Difficulty {
    /// No prior knowledge assumed.
    #[default]
    Beginner,
    /// Some familiarity with the subject assumed.
    Intermediate,
    /// Substantial prior knowledge assumed.
    Advanced,
}

impl Difficulty {
    /// All difficulty levels, easiest first.
    pub const ALL: [Self; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    /// The lower-case name used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = InvalidDifficulty;

    /// Parses a difficulty, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InvalidDifficulty(s.to_string()))
    }
}

impl TryFrom<String> for Difficulty {
    type Error = InvalidDifficulty;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Difficulty> for String {
    fn from(value: Difficulty) -> Self {
        value.as_str().to_string()
    }
}

/// Error returned when a string is not one of the known difficulty levels.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid difficulty '{0}': expected beginner, intermediate or advanced")]
pub struct InvalidDifficulty(String);

/// A learning path: a titled, ordered collection of resources.
///
/// Records are only ever replaced wholesale; there is no partial update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPath {
    /// Unique identifier within the store.
    pub id: PathId,
    /// Display title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Category tag, e.g. `programming` or `design`. The set is open.
    pub category: String,
    /// Difficulty level.
    pub difficulty: Difficulty,
    /// Free-text tags, in display order.
    pub tags: Vec<String>,
    /// URL of the cover image.
    pub cover_image: String,
    /// Resources in their intended learning order.
    pub resources: Vec<Resource>,
    /// ISO-8601 creation timestamp, kept verbatim.
    pub created_at: String,
    /// Rating between 0 and 5.
    pub rating: f64,
    /// Number of learners following the path.
    pub learners: u64,
}

impl LearningPath {
    /// The creation timestamp, if `created_at` parses as RFC 3339.
    #[must_use]
    pub fn created(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|timestamp| timestamp.with_timezone(&Utc))
    }

    /// Find a resource by its id.
    #[must_use]
    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|resource| resource.id == id)
    }

    /// Find a resource by its id, mutably.
    pub fn resource_mut(&mut self, id: &str) -> Option<&mut Resource> {
        self.resources.iter_mut().find(|resource| resource.id == id)
    }

    /// An id for a new resource that no existing resource uses.
    #[must_use]
    pub fn next_resource_id(&self) -> String {
        (self.resources.len() + 1..)
            .map(|n| n.to_string())
            .find(|candidate| self.resource(candidate).is_none())
            .unwrap_or_default()
    }
}
