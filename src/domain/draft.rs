use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::{Config, Difficulty, LearningPath, PathId, Resource};

/// Author input for a new learning path.
///
/// Publishing turns a draft into a complete [`LearningPath`], filling in the
/// fields an author doesn't choose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathDraft {
    /// Title of the new path.
    pub title: String,
    /// Description of the new path.
    pub description: String,
    /// Category of the new path.
    pub category: String,
    /// Difficulty of the new path.
    pub difficulty: Difficulty,
    /// Comma-separated tags, as typed by the author.
    pub tags: String,
    /// Cover image URL. Empty means "use the configured default".
    pub cover_image: String,
    /// Resources, in learning order.
    pub resources: Vec<Resource>,
}

impl PathDraft {
    /// Publish the draft now.
    ///
    /// See [`PathDraft::publish_at`].
    #[must_use]
    pub fn publish<'a>(
        self,
        config: &Config,
        existing: impl IntoIterator<Item = &'a LearningPath>,
    ) -> LearningPath {
        self.publish_at(config, existing, Utc::now())
    }

    /// Publish the draft as of `now`.
    ///
    /// The id is derived from the millisecond timestamp and bumped until it
    /// doesn't collide with any of `existing`. New paths start with the
    /// configured rating and no learners.
    #[must_use]
    pub fn publish_at<'a>(
        self,
        config: &Config,
        existing: impl IntoIterator<Item = &'a LearningPath>,
        now: DateTime<Utc>,
    ) -> LearningPath {
        let taken: Vec<&PathId> = existing.into_iter().map(|path| &path.id).collect();

        let mut millis = now.timestamp_millis();
        let id = loop {
            let candidate = PathId::new(millis.to_string());
            if !taken.contains(&&candidate) {
                break candidate;
            }
            millis += 1;
        };

        let cover_image = if self.cover_image.trim().is_empty() {
            config.default_cover_image().to_string()
        } else {
            self.cover_image
        };

        LearningPath {
            id,
            title: self.title,
            description: self.description,
            category: self.category,
            difficulty: self.difficulty,
            tags: split_tags(&self.tags),
            cover_image,
            resources: self.resources,
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            rating: config.initial_rating(),
            learners: 0,
        }
    }
}

/// Split comma-separated tags, trimming each and dropping empty ones.
fn split_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap()
    }

    #[test]
    fn publish_fills_in_defaults() {
        let config = Config::default();
        let draft = PathDraft {
            title: "Rust in Practice".to_string(),
            category: "programming".to_string(),
            tags: " rust, , systems ,".to_string(),
            ..PathDraft::default()
        };

        let path = draft.publish_at(&config, [], now());

        assert_eq!(path.id, PathId::new(now().timestamp_millis().to_string()));
        assert_eq!(path.tags, vec!["rust".to_string(), "systems".to_string()]);
        assert_eq!(path.cover_image, config.default_cover_image());
        assert!((path.rating - 4.8).abs() < f64::EPSILON);
        assert_eq!(path.learners, 0);
        assert_eq!(path.created_at, "2024-05-01T08:30:00.000Z");
        assert_eq!(path.created(), Some(now()));
    }

    #[test]
    fn publish_keeps_explicit_cover_image() {
        let draft = PathDraft {
            cover_image: "https://example.com/cover.png".to_string(),
            ..PathDraft::default()
        };

        let path = draft.publish_at(&Config::default(), [], now());

        assert_eq!(path.cover_image, "https://example.com/cover.png");
    }

    #[test]
    fn publish_avoids_id_collisions() {
        let config = Config::default();
        let first = PathDraft::default().publish_at(&config, [], now());
        let second = PathDraft::default().publish_at(&config, [&first], now());

        assert_ne!(first.id, second.id);
        assert_eq!(
            second.id,
            PathId::new((now().timestamp_millis() + 1).to_string())
        );
    }

    #[test]
    fn split_tags_preserves_order_and_duplicates() {
        assert_eq!(split_tags("b, a, b"), vec!["b", "a", "b"]);
        assert!(split_tags("  ").is_empty());
    }
}
