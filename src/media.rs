//! Previews for video resources.
//!
//! Only YouTube is recognised. Anything else renders as a plain link.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{MediaKind, Resource, ResourceTarget};

static YOUTUBE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*")
        .unwrap_or_else(|e| unreachable!("invalid YouTube pattern: {e}"))
});

const VIDEO_ID_LEN: usize = 11;

/// Whether the URL points at YouTube.
#[must_use]
pub fn is_youtube_url(url: &str) -> bool {
    url.contains("youtube.com") || url.contains("youtu.be")
}

/// Extract the 11-character YouTube video id from a URL.
///
/// Understands `watch?v=`, `youtu.be/`, `embed/`, `v/` and `u/<x>/` forms.
#[must_use]
pub fn extract_youtube_video_id(url: &str) -> Option<&str> {
    let id = YOUTUBE_ID.captures(url)?.get(2)?.as_str();
    (id.len() == VIDEO_ID_LEN).then_some(id)
}

/// The medium-quality thumbnail for a YouTube video.
#[must_use]
pub fn youtube_thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/mqdefault.jpg")
}

/// What to show in place of a video resource's URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoPreview {
    /// The YouTube video id.
    pub video_id: String,
    /// Thumbnail image URL.
    pub thumbnail_url: String,
    /// Embeddable player URL.
    pub embed_url: String,
}

/// The video preview for a resource, if it is a YouTube video.
#[must_use]
pub fn preview_for(resource: &Resource) -> Option<VideoPreview> {
    let ResourceTarget::External {
        media: MediaKind::Video,
        url,
    } = &resource.target
    else {
        return None;
    };

    if !is_youtube_url(url) {
        return None;
    }

    let video_id = extract_youtube_video_id(url)?;
    Some(VideoPreview {
        video_id: video_id.to_string(),
        thumbnail_url: youtube_thumbnail_url(video_id),
        embed_url: format!("https://www.youtube.com/embed/{video_id}"),
    })
}
