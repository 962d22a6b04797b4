//! Searching, filtering and sorting learning paths.
//!
//! All operations are pure: they take a snapshot of the collection and return
//! a new sequence. Searching and filtering preserve the input order; sorting is
//! stable.

use std::{cmp::Ordering, str::FromStr};

use chrono::{DateTime, Utc};

use crate::domain::LearningPath;

/// Keep the paths matching a free-text query.
///
/// A query that is empty after trimming returns the input unchanged. Otherwise
/// a path matches if the lower-cased query is a substring of its title,
/// description, category, difficulty, any tag, or the title or description of
/// any of its resources.
#[must_use]
pub fn search(paths: Vec<LearningPath>, query: &str) -> Vec<LearningPath> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return paths;
    }

    paths
        .into_iter()
        .filter(|path| matches_text(path, &needle))
        .collect()
}

fn matches_text(path: &LearningPath, needle: &str) -> bool {
    let contains = |haystack: &str| haystack.to_lowercase().contains(needle);

    contains(&path.title)
        || contains(&path.description)
        || contains(&path.category)
        || contains(path.difficulty.as_str())
        || path.tags.iter().any(|tag| contains(tag))
        || path
            .resources
            .iter()
            .any(|resource| contains(&resource.title) || contains(&resource.description))
}

/// Keep the paths in the given category.
///
/// `"all"` keeps everything. Matching is case-insensitive.
#[must_use]
pub fn filter_by_category(paths: Vec<LearningPath>, category: &str) -> Vec<LearningPath> {
    if category == "all" {
        return paths;
    }

    paths
        .into_iter()
        .filter(|path| path.category.eq_ignore_ascii_case(category))
        .collect()
}

/// Keep the paths with the given difficulty.
///
/// Matching is case-insensitive; an unrecognised difficulty matches nothing.
#[must_use]
pub fn filter_by_difficulty(paths: Vec<LearningPath>, difficulty: &str) -> Vec<LearningPath> {
    paths
        .into_iter()
        .filter(|path| path.difficulty.as_str().eq_ignore_ascii_case(difficulty))
        .collect()
}

/// The order to present learning paths in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    /// Keep the input order.
    #[default]
    Relevance,
    /// Most learners first.
    Popular,
    /// Most recently created first.
    Newest,
    /// Highest rated first.
    Rating,
}

impl SortKey {
    /// Every sort key, in display order.
    pub const ALL: [Self; 4] = [Self::Relevance, Self::Popular, Self::Newest, Self::Rating];

    /// The key's name as accepted by [`SortKey::from_str`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Popular => "popular",
            Self::Newest => "newest",
            Self::Rating => "rating",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = std::convert::Infallible;

    /// Unknown keys fall back to [`SortKey::Relevance`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
            .unwrap_or_else(|| {
                tracing::debug!("unknown sort key '{s}', keeping input order");
                Self::Relevance
            });
        Ok(key)
    }
}

/// Order paths by the given key.
///
/// The sort is stable: paths with equal keys keep their input order. Under
/// [`SortKey::Newest`], paths whose `createdAt` cannot be parsed come after
/// every path whose timestamp can.
#[must_use]
pub fn sort(mut paths: Vec<LearningPath>, key: SortKey) -> Vec<LearningPath> {
    match key {
        SortKey::Relevance => {}
        SortKey::Popular => paths.sort_by(|a, b| b.learners.cmp(&a.learners)),
        SortKey::Rating => paths.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        SortKey::Newest => paths.sort_by(|a, b| newest_first(a.created(), b.created())),
    }
    paths
}

fn newest_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// A composed search: text, then category, then difficulty, then order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Free text; empty matches everything.
    pub text: String,
    /// Category filter; `None` or `"all"` keeps everything.
    pub category: Option<String>,
    /// Difficulty filter; `None` or `"all"` keeps everything.
    pub difficulty: Option<String>,
    /// Result order.
    pub sort: SortKey,
}

impl Query {
    /// Run the query over a snapshot of the collection.
    #[must_use]
    pub fn apply(&self, paths: Vec<LearningPath>) -> Vec<LearningPath> {
        let mut paths = search(paths, &self.text);

        if let Some(category) = &self.category {
            paths = filter_by_category(paths, category);
        }

        if let Some(difficulty) = self.difficulty.as_deref().filter(|d| *d != "all") {
            paths = filter_by_difficulty(paths, difficulty);
        }

        sort(paths, self.sort)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::{seed::sample_paths, Difficulty, PathId};

    fn ids(paths: &[LearningPath]) -> Vec<&str> {
        paths.iter().map(|path| path.id.as_str()).collect()
    }

    fn path(id: &str, learners: u64, rating: f64, created_at: &str) -> LearningPath {
        LearningPath {
            id: PathId::from(id),
            title: format!("Path {id}"),
            description: String::new(),
            category: "other".to_string(),
            difficulty: Difficulty::Beginner,
            tags: Vec::new(),
            cover_image: String::new(),
            resources: Vec::new(),
            created_at: created_at.to_string(),
            rating,
            learners,
        }
    }

    #[test_case("javascript", &["1"]; "tag")]
    #[test_case("  JavaScript ", &["1"]; "trimmed and case insensitive")]
    #[test_case("design", &["3"]; "category")]
    #[test_case("intermediate", &["2"]; "difficulty")]
    #[test_case("handbook", &["2"]; "resource title")]
    #[test_case("aesthetically", &["3"]; "resource description")]
    #[test_case("zzz", &[]; "no match")]
    fn search_matches_fields(query: &str, expected: &[&str]) {
        let found = search(sample_paths(), query);

        assert_eq!(ids(&found), expected);
    }

    #[test_case(""; "empty")]
    #[test_case("   "; "blank")]
    fn blank_search_is_identity(query: &str) {
        assert_eq!(search(sample_paths(), query), sample_paths());
    }

    #[test]
    fn search_is_idempotent() {
        let once = search(sample_paths(), "learn");
        let twice = search(once.clone(), "learn");

        assert_eq!(once, twice);
    }

    #[test]
    fn search_preserves_input_order() {
        let mut paths = sample_paths();
        paths.reverse();

        let found = search(paths, "e");

        assert_eq!(ids(&found), ["3", "2", "1"]);
    }

    #[test_case("all", &["1", "2", "3"]; "all is passthrough")]
    #[test_case("programming", &["1"]; "exact")]
    #[test_case("DataScience", &["2"]; "case insensitive")]
    #[test_case("business", &[]; "no match")]
    fn filter_category(category: &str, expected: &[&str]) {
        assert_eq!(ids(&filter_by_category(sample_paths(), category)), expected);
    }

    #[test_case("intermediate", &["2"])]
    #[test_case("BEGINNER", &["1", "3"])]
    #[test_case("advanced", &[])]
    fn filter_difficulty(difficulty: &str, expected: &[&str]) {
        assert_eq!(ids(&filter_by_difficulty(sample_paths(), difficulty)), expected);
    }

    #[test_case(SortKey::Popular, &["1", "2", "3"])]
    #[test_case(SortKey::Rating, &["3", "1", "2"])]
    #[test_case(SortKey::Newest, &["3", "2", "1"])]
    #[test_case(SortKey::Relevance, &["1", "2", "3"])]
    fn sort_seeded_paths(key: SortKey, expected: &[&str]) {
        assert_eq!(ids(&sort(sample_paths(), key)), expected);
    }

    #[test]
    fn sort_does_not_touch_its_input() {
        let input = sample_paths();
        let snapshot = input.clone();

        let _ = sort(input.clone(), SortKey::Rating);

        assert_eq!(input, snapshot);
    }

    #[test_case(SortKey::Popular)]
    #[test_case(SortKey::Rating)]
    #[test_case(SortKey::Newest)]
    fn sort_is_stable_on_ties(key: SortKey) {
        let paths = vec![
            path("a", 10, 4.5, "2024-01-01T00:00:00Z"),
            path("b", 10, 4.5, "2024-01-01T00:00:00Z"),
            path("c", 10, 4.5, "2024-01-01T00:00:00Z"),
        ];

        assert_eq!(ids(&sort(paths, key)), ["a", "b", "c"]);
    }

    #[test_case(SortKey::Relevance)]
    #[test_case(SortKey::Popular)]
    #[test_case(SortKey::Rating)]
    #[test_case(SortKey::Newest)]
    fn sort_is_idempotent(key: SortKey) {
        let mut paths = sample_paths();
        paths.push(path("tie", 10, 4.5, "2024-01-01T00:00:00Z"));
        paths.push(path("bad", 10, 4.5, "yesterday"));

        let once = sort(paths, key);
        let twice = sort(once.clone(), key);

        assert_eq!(twice, once);
    }

    #[test]
    fn unparseable_dates_sort_last() {
        let paths = vec![
            path("bad", 0, 0.0, "yesterday"),
            path("old", 0, 0.0, "2020-01-01T00:00:00Z"),
            path("worse", 0, 0.0, ""),
            path("new", 0, 0.0, "2024-06-01T12:00:00.000Z"),
        ];

        assert_eq!(
            ids(&sort(paths, SortKey::Newest)),
            ["new", "old", "bad", "worse"]
        );
    }

    #[test_case("popular", SortKey::Popular)]
    #[test_case("Newest", SortKey::Newest)]
    #[test_case("rating", SortKey::Rating)]
    #[test_case("relevance", SortKey::Relevance)]
    #[test_case("whatever", SortKey::Relevance; "unknown falls back")]
    fn parse_sort_key(input: &str, expected: SortKey) {
        assert_eq!(input.parse::<SortKey>(), Ok(expected));
    }

    #[test]
    fn query_composes_in_order() {
        let query = Query {
            text: "learn".to_string(),
            category: Some("all".to_string()),
            difficulty: Some("intermediate".to_string()),
            sort: SortKey::Rating,
        };

        let found = query.apply(sample_paths());

        assert!(found.iter().all(|path| path.difficulty == Difficulty::Intermediate));
        assert!(found.windows(2).all(|w| w[0].rating >= w[1].rating));
    }

    #[test]
    fn default_query_is_identity() {
        assert_eq!(Query::default().apply(sample_paths()), sample_paths());
    }

    #[test]
    fn all_difficulty_is_passthrough_in_query() {
        let query = Query {
            difficulty: Some("all".to_string()),
            ..Query::default()
        };

        assert_eq!(query.apply(sample_paths()).len(), 3);
    }
}
