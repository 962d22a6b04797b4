use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::{LearningPath, PathId};

/// The type tag of a resource, as stored and as chosen by an author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A video, e.g. on YouTube.
    Video,
    /// A web page or article.
    Website,
    /// A PDF document.
    Pdf,
    /// An image.
    Image,
    /// A link to another learning path.
    LearningPath,
    /// Anything else.
    Other,
}

impl ResourceKind {
    /// All resource kinds, in the order they are offered to authors.
    pub const ALL: [Self; 6] = [
        Self::Video,
        Self::Website,
        Self::Pdf,
        Self::Image,
        Self::LearningPath,
        Self::Other,
    ];

    /// The name used for the `type` field on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Website => "website",
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::LearningPath => "learningPath",
            Self::Other => "other",
        }
    }

    /// The media kind for external resources, `None` for path links.
    #[must_use]
    pub const fn media(self) -> Option<MediaKind> {
        match self {
            Self::Video => Some(MediaKind::Video),
            Self::Website => Some(MediaKind::Website),
            Self::Pdf => Some(MediaKind::Pdf),
            Self::Image => Some(MediaKind::Image),
            Self::Other => Some(MediaKind::Other),
            Self::LearningPath => None,
        }
    }

    /// Lenient decoding of a stored `type` field.
    ///
    /// The legacy `article` type reads as [`ResourceKind::Website`]; anything
    /// unrecognised reads as [`ResourceKind::Other`].
    fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::debug!("unrecognised resource type '{value}', reading as 'other'");
            Self::Other
        })
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = UnknownResourceKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim();
        if normalized.eq_ignore_ascii_case("article") {
            return Ok(Self::Website);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| UnknownResourceKind(s.to_string()))
    }
}

/// Error returned when a string is not a known resource type.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error(
    "unknown resource type '{0}': expected video, website, pdf, image, learningPath or other"
)]
pub struct UnknownResourceKind(String);

/// The media kind of a resource that points at an external URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// A video.
    Video,
    /// A web page or article.
    Website,
    /// A PDF document.
    Pdf,
    /// An image.
    Image,
    /// Anything else.
    Other,
}

impl From<MediaKind> for ResourceKind {
    fn from(value: MediaKind) -> Self {
        match value {
            MediaKind::Video => Self::Video,
            MediaKind::Website => Self::Website,
            MediaKind::Pdf => Self::Pdf,
            MediaKind::Image => Self::Image,
            MediaKind::Other => Self::Other,
        }
    }
}

/// Display fields of a learning path, copied into a resource that links to
/// it.
///
/// The snapshot is taken when the link is made and is never updated
/// implicitly. See [`crate::linking::stale_previews`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedPathPreview {
    /// Id of the linked path at the time of linking.
    pub id: PathId,
    /// Title of the linked path.
    pub title: String,
    /// Cover image of the linked path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    /// Category of the linked path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Difficulty of the linked path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

impl LinkedPathPreview {
    /// Snapshot the current display fields of `path`.
    #[must_use]
    pub fn of(path: &LearningPath) -> Self {
        Self {
            id: path.id.clone(),
            title: path.title.clone(),
            cover_image: Some(path.cover_image.clone()),
            category: Some(path.category.clone()),
            difficulty: Some(path.difficulty.as_str().to_string()),
        }
    }
}

/// A reference from a resource to another learning path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathLink {
    /// Id of the linked path. Empty until the author picks a target.
    pub target: PathId,
    /// Preview captured when the target was picked.
    pub preview: Option<LinkedPathPreview>,
}

impl PathLink {
    /// Whether a target has been picked.
    #[must_use]
    pub fn is_set(&self) -> bool {
        !self.target.is_empty()
    }

    /// Whether the preview (if any) describes the linked target.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.preview
            .as_ref()
            .is_none_or(|preview| preview.id == self.target)
    }
}

/// What a resource points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceTarget {
    /// An external URL of the given media kind.
    External {
        /// Media kind of the linked content.
        media: MediaKind,
        /// Absolute URL of the content.
        url: String,
    },
    /// Another learning path.
    Path(PathLink),
}

/// One entry of a learning path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ResourceRecord", into = "ResourceRecord")]
pub struct Resource {
    /// Unique within the parent path.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// What the resource points at.
    pub target: ResourceTarget,
}

impl Resource {
    /// Create a resource pointing at an external URL.
    #[must_use]
    pub fn external(
        id: impl Into<String>,
        media: MediaKind,
        title: impl Into<String>,
        url: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            target: ResourceTarget::External {
                media,
                url: url.into(),
            },
        }
    }

    /// The type tag of this resource.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        match &self.target {
            ResourceTarget::External { media, .. } => match media {
                MediaKind::Video => ResourceKind::Video,
                MediaKind::Website => ResourceKind::Website,
                MediaKind::Pdf => ResourceKind::Pdf,
                MediaKind::Image => ResourceKind::Image,
                MediaKind::Other => ResourceKind::Other,
            },
            ResourceTarget::Path(_) => ResourceKind::LearningPath,
        }
    }

    /// The stored `url` field: the URL for external resources, the target
    /// path id for path links.
    #[must_use]
    pub fn url(&self) -> &str {
        match &self.target {
            ResourceTarget::External { url, .. } => url,
            ResourceTarget::Path(link) => link.target.as_str(),
        }
    }

    /// The path link, if this resource points at another learning path.
    #[must_use]
    pub const fn as_link(&self) -> Option<&PathLink> {
        match &self.target {
            ResourceTarget::Path(link) => Some(link),
            ResourceTarget::External { .. } => None,
        }
    }

    /// The path link, mutably.
    pub const fn as_link_mut(&mut self) -> Option<&mut PathLink> {
        match &mut self.target {
            ResourceTarget::Path(link) => Some(link),
            ResourceTarget::External { .. } => None,
        }
    }

    /// The linked path preview, if any.
    #[must_use]
    pub fn linked_preview(&self) -> Option<&LinkedPathPreview> {
        self.as_link().and_then(|link| link.preview.as_ref())
    }

    /// Change the type of this resource.
    ///
    /// - switching away from [`ResourceKind::LearningPath`] clears the url and
    ///   the preview
    /// - switching to [`ResourceKind::LearningPath`] leaves an unset link
    /// - switching between external kinds keeps the url
    pub fn set_kind(&mut self, kind: ResourceKind) {
        self.target = match (kind.media(), &mut self.target) {
            (Some(media), ResourceTarget::External { url, .. }) => ResourceTarget::External {
                media,
                url: std::mem::take(url),
            },
            (Some(media), ResourceTarget::Path(_)) => ResourceTarget::External {
                media,
                url: String::new(),
            },
            (None, ResourceTarget::Path(link)) => ResourceTarget::Path(std::mem::take(link)),
            (None, ResourceTarget::External { .. }) => ResourceTarget::Path(PathLink::default()),
        };
    }
}

/// The flat, overloaded representation used in storage.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceRecord {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    title: String,
    url: String,
    #[serde(default)]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    linked_path_preview: Option<LinkedPathPreview>,
}

impl From<ResourceRecord> for Resource {
    fn from(record: ResourceRecord) -> Self {
        let ResourceRecord {
            id,
            kind,
            title,
            url,
            description,
            linked_path_preview,
        } = record;

        let target = match ResourceKind::from_stored(&kind).media() {
            Some(media) => ResourceTarget::External { media, url },
            None => ResourceTarget::Path(PathLink {
                target: PathId::from(url),
                preview: linked_path_preview,
            }),
        };

        Self {
            id,
            title,
            description,
            target,
        }
    }
}

impl From<Resource> for ResourceRecord {
    fn from(resource: Resource) -> Self {
        let kind = resource.kind().as_str().to_string();
        let Resource {
            id,
            title,
            description,
            target,
        } = resource;

        let (url, linked_path_preview) = match target {
            ResourceTarget::External { url, .. } => (url, None),
            ResourceTarget::Path(PathLink { target, preview }) => (target.to_string(), preview),
        };

        Self {
            id,
            kind,
            title,
            url,
            description,
            linked_path_preview,
        }
    }
}
