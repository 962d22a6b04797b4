//! CRUD over the learning-path collection.
//!
//! [`PathRepository`] is the interface the UI layer depends on; construct a
//! [`Repository`] and pass it in explicitly. Every operation reads the whole
//! collection, changes it, and writes the whole collection back, with no
//! suspension point in between.

use std::path::PathBuf;

use crate::{
    domain::{Config, LearningPath, PathId, Resource, ResourceKind},
    linking::{self, DanglingLink, LinkError, RefreshResult, StalePreview},
    storage::{
        collection::PathStore,
        kv::{FileStore, KeyValueStore, StorageError},
    },
};

/// Read and write learning paths by id.
pub trait PathRepository {
    /// All learning paths, in stored order.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is unavailable.
    fn get_all(&self) -> Result<Vec<LearningPath>, StorageError>;

    /// The learning path with the given id, if any.
    ///
    /// A missing id is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is unavailable.
    fn get_by_id(&self, id: &str) -> Result<Option<LearningPath>, StorageError>;

    /// Insert or replace a learning path.
    ///
    /// An existing record with the same id is replaced in place; a new record
    /// is put at the front of the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is unavailable or full.
    fn save(&self, path: LearningPath) -> Result<(), StorageError>;

    /// Remove the learning path with the given id.
    ///
    /// Returns whether a record was removed. Removing a missing id is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is unavailable or full.
    fn delete(&self, id: &str) -> Result<bool, StorageError>;
}

/// A [`PathRepository`] backed by a [`PathStore`].
#[derive(Debug)]
pub struct Repository<S> {
    store: PathStore<S>,
    config: Config,
}

impl Repository<FileStore> {
    /// Opens the file-backed repository rooted at the given directory.
    ///
    /// Configuration is read from `config.toml` in the root, falling back to
    /// the defaults.
    #[must_use]
    pub fn open(root: PathBuf) -> Self {
        let config = Config::load_or_default(&root);
        Self::new(FileStore::new(root), config)
    }

    /// The directory the collection is stored in.
    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        self.store.backend().root()
    }
}

impl<S: KeyValueStore> Repository<S> {
    /// Creates a repository over the given key-value store.
    #[must_use]
    pub fn new(store: S, config: Config) -> Self {
        Self {
            store: PathStore::new(store, &config),
            config,
        }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The underlying persistent store.
    #[must_use]
    pub const fn store(&self) -> &PathStore<S> {
        &self.store
    }

    fn load(&self) -> Result<Vec<LearningPath>, StorageError> {
        self.store.initialize()?;
        self.store.get_all()
    }

    /// Apply `change` to the path with the given id and persist the result.
    ///
    /// Returns the updated path, or `None` (writing nothing) if there is no
    /// such path.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is unavailable or full.
    pub fn update<F>(&self, id: &str, change: F) -> Result<Option<LearningPath>, StorageError>
    where
        F: FnOnce(&mut LearningPath),
    {
        let mut paths = self.load()?;
        let Some(path) = paths.iter_mut().find(|path| path.id == id) else {
            return Ok(None);
        };
        change(path);
        let updated = path.clone();
        self.store.replace_all(&paths)?;
        Ok(Some(updated))
    }

    /// Append a resource to the path with the given id.
    ///
    /// # Errors
    ///
    /// Fails if the path doesn't exist or the storage is unavailable.
    pub fn add_resource(&self, id: &str, resource: Resource) -> Result<LearningPath, LinkError> {
        self.update(id, |path| path.resources.push(resource))?
            .ok_or_else(|| LinkError::PathNotFound(PathId::from(id)))
    }

    /// Change the type of one resource.
    ///
    /// Switching away from a path link clears its url and preview.
    ///
    /// # Errors
    ///
    /// Fails if the path or resource doesn't exist or the storage is
    /// unavailable.
    pub fn set_resource_kind(
        &self,
        id: &str,
        resource_id: &str,
        kind: ResourceKind,
    ) -> Result<LearningPath, LinkError> {
        let mut paths = self.load()?;
        let path = paths
            .iter_mut()
            .find(|path| path.id == id)
            .ok_or_else(|| LinkError::PathNotFound(PathId::from(id)))?;
        let resource = path
            .resource_mut(resource_id)
            .ok_or_else(|| LinkError::ResourceNotFound {
                path: PathId::from(id),
                resource: resource_id.to_string(),
            })?;
        resource.set_kind(kind);
        let updated = path.clone();
        self.store.replace_all(&paths)?;
        Ok(updated)
    }

    /// Link a resource to another learning path and persist the change.
    ///
    /// # Errors
    ///
    /// Fails if the path, resource or target doesn't exist, if the target is
    /// the path itself, or if the storage is unavailable.
    pub fn link_resource(
        &self,
        id: &str,
        resource_id: &str,
        target_id: &str,
    ) -> Result<LearningPath, LinkError> {
        let mut paths = self.load()?;
        linking::link_resource(&mut paths, id, resource_id, target_id)?;
        self.store.replace_all(&paths)?;

        tracing::info!("linked resource {resource_id} of {id} to {target_id}");

        paths
            .into_iter()
            .find(|path| path.id == id)
            .ok_or_else(|| LinkError::PathNotFound(PathId::from(id)))
    }

    /// Find all linking resources whose preview no longer matches the target.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is unavailable.
    pub fn stale_previews(&self) -> Result<Vec<StalePreview>, StorageError> {
        Ok(linking::stale_previews(&self.load()?))
    }

    /// Find all links whose target no longer exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is unavailable.
    pub fn dangling_links(&self) -> Result<Vec<DanglingLink>, StorageError> {
        Ok(linking::dangling_links(&self.load()?))
    }

    /// Refresh the preview of one linking resource.
    ///
    /// Nothing is written if the preview was already up to date.
    ///
    /// # Errors
    ///
    /// Fails if the resource is not a live link or the storage is unavailable.
    pub fn refresh_preview(
        &self,
        id: &str,
        resource_id: &str,
    ) -> Result<RefreshResult, LinkError> {
        let mut paths = self.load()?;
        let result = linking::refresh_preview(&mut paths, id, resource_id)?;
        if result == RefreshResult::Updated {
            self.store.replace_all(&paths)?;
        }
        Ok(result)
    }

    /// Refresh every stale preview.
    ///
    /// Returns the (path, resource) pairs that were updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is unavailable or full.
    pub fn refresh_previews(&self) -> Result<Vec<(PathId, String)>, StorageError> {
        let mut paths = self.load()?;
        let updated = linking::refresh_all(&mut paths);
        if !updated.is_empty() {
            self.store.replace_all(&paths)?;
        }
        Ok(updated)
    }
}

impl<S: KeyValueStore> PathRepository for Repository<S> {
    fn get_all(&self) -> Result<Vec<LearningPath>, StorageError> {
        self.load()
    }

    fn get_by_id(&self, id: &str) -> Result<Option<LearningPath>, StorageError> {
        Ok(self.load()?.into_iter().find(|path| path.id == id))
    }

    fn save(&self, path: LearningPath) -> Result<(), StorageError> {
        let mut paths = self.load()?;

        if let Some(existing) = paths.iter_mut().find(|existing| existing.id == path.id) {
            tracing::debug!("replacing learning path {}", path.id);
            *existing = path;
        } else {
            tracing::debug!("adding learning path {}", path.id);
            paths.insert(0, path);
        }

        self.store.replace_all(&paths)
    }

    fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let mut paths = self.load()?;
        let before = paths.len();
        paths.retain(|path| path.id != id);
        let removed = paths.len() < before;

        self.store.replace_all(&paths)?;

        if removed {
            tracing::info!("deleted learning path {id}");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        domain::{Difficulty, MediaKind, PathDraft},
        query,
        storage::kv::MemoryStore,
    };

    fn repository() -> Repository<MemoryStore> {
        Repository::new(MemoryStore::new(), Config::default())
    }

    fn new_path(id: &str, title: &str) -> LearningPath {
        LearningPath {
            id: PathId::from(id),
            title: title.to_string(),
            description: "A new path".to_string(),
            category: "other".to_string(),
            difficulty: Difficulty::Advanced,
            tags: vec!["new".to_string()],
            cover_image: "https://example.com/cover.png".to_string(),
            resources: vec![Resource::external(
                "r1",
                MediaKind::Pdf,
                "Notes",
                "https://example.com/notes.pdf",
                "",
            )],
            created_at: "2024-01-01T00:00:00Z".to_string(),
            rating: 4.8,
            learners: 0,
        }
    }

    #[test]
    fn get_all_seeds_on_first_use() {
        let repo = repository();

        let paths = repo.get_all().unwrap();

        assert_eq!(paths.len(), 3);
        assert_eq!(paths[0].title, "Full-Stack Web Development Roadmap");
    }

    #[test]
    fn get_by_id_returns_none_for_missing_id() {
        let repo = repository();

        assert!(repo.get_by_id("does-not-exist").unwrap().is_none());
        assert_eq!(repo.get_by_id("2").unwrap().unwrap().id, "2");
    }

    #[test]
    fn save_new_path_is_prepended() {
        let repo = repository();
        let path = new_path("999", "Compilers");

        repo.save(path.clone()).unwrap();

        let paths = repo.get_all().unwrap();
        assert_eq!(paths.len(), 4);
        assert_eq!(paths[0], path);
        assert_eq!(repo.get_by_id("999").unwrap().unwrap(), path);
    }

    #[test]
    fn save_existing_path_replaces_in_place() {
        let repo = repository();
        repo.save(new_path("999", "Compilers")).unwrap();
        repo.save(new_path("1000", "Databases")).unwrap();

        let mut edited = new_path("999", "Compilers, Second Edition");
        edited.tags = vec!["parsing".to_string()];
        repo.save(edited.clone()).unwrap();

        let paths = repo.get_all().unwrap();
        assert_eq!(paths.len(), 5);
        assert_eq!(paths.iter().filter(|path| path.id == "999").count(), 1);
        assert_eq!(paths[1], edited);
        assert_eq!(paths[0].id, "1000");
    }

    #[test]
    fn delete_removes_exactly_one_record() {
        let repo = repository();

        assert!(repo.delete("2").unwrap());

        assert!(repo.get_by_id("2").unwrap().is_none());
        assert_eq!(repo.get_all().unwrap().len(), 2);
    }

    #[test]
    fn delete_missing_id_is_a_no_op() {
        let repo = repository();

        assert!(!repo.delete("nope").unwrap());

        assert_eq!(repo.get_all().unwrap().len(), 3);
    }

    #[test]
    fn self_links_are_accepted_when_saved_directly() {
        let repo = repository();
        let mut path = new_path("999", "Loop");
        let target = path.clone();
        linking::link_to(&mut path.resources[0], &target);

        repo.save(path.clone()).unwrap();

        assert_eq!(repo.get_by_id("999").unwrap().unwrap(), path);
    }

    #[test]
    fn link_resource_persists_preview() {
        let repo = repository();

        let updated = repo.link_resource("1", "1-3", "2").unwrap();
        let reloaded = repo.get_by_id("1").unwrap().unwrap();

        assert_eq!(updated, reloaded);
        let resource = reloaded.resource("1-3").unwrap();
        assert_eq!(resource.linked_preview().unwrap().id.as_str(), resource.url());
    }

    #[test]
    fn link_resource_rejects_self_link() {
        let repo = repository();

        let error = repo.link_resource("1", "1-3", "1").unwrap_err();

        assert!(matches!(error, LinkError::SelfLink(_)));
    }

    #[test]
    fn deleting_a_linked_path_leaves_preview_untouched() {
        let repo = repository();
        repo.link_resource("1", "1-1", "3").unwrap();
        let before = repo.get_by_id("1").unwrap().unwrap();

        repo.delete("3").unwrap();

        let after = repo.get_by_id("1").unwrap().unwrap();
        assert_eq!(after, before);
        let resource = after.resource("1-1").unwrap();
        assert_eq!(resource.linked_preview().unwrap().id, "3");
        assert_eq!(repo.dangling_links().unwrap().len(), 1);
    }

    #[test]
    fn previews_are_only_refreshed_on_request() {
        let repo = repository();
        repo.link_resource("1", "1-1", "2").unwrap();

        let mut target = repo.get_by_id("2").unwrap().unwrap();
        target.title = "ML Fundamentals".to_string();
        repo.save(target).unwrap();

        let stale = repo.stale_previews().unwrap();
        assert_eq!(stale.len(), 1);
        let linking = repo.get_by_id("1").unwrap().unwrap();
        assert_eq!(
            linking.resource("1-1").unwrap().linked_preview().unwrap().title,
            "Machine Learning Fundamentals"
        );

        assert_eq!(
            repo.refresh_previews().unwrap(),
            vec![(PathId::from("1"), "1-1".to_string())]
        );
        assert!(repo.stale_previews().unwrap().is_empty());
        assert_eq!(
            repo.refresh_preview("1", "1-1").unwrap(),
            RefreshResult::AlreadyUpToDate
        );
    }

    #[test]
    fn set_resource_kind_clears_link() {
        let repo = repository();
        repo.link_resource("1", "1-1", "2").unwrap();

        let updated = repo
            .set_resource_kind("1", "1-1", ResourceKind::Video)
            .unwrap();

        let resource = updated.resource("1-1").unwrap();
        assert_eq!(resource.url(), "");
        assert!(resource.linked_preview().is_none());
    }

    #[test]
    fn add_resource_appends_in_order() {
        let repo = repository();
        let resource = Resource::external("2-3", MediaKind::Image, "Diagram", "https://x.y/z.png", "");

        let updated = repo.add_resource("2", resource.clone()).unwrap();

        assert_eq!(updated.resources.last(), Some(&resource));
        assert!(matches!(
            repo.add_resource("nope", resource),
            Err(LinkError::PathNotFound(_))
        ));
    }

    #[test]
    fn quota_exceeded_is_surfaced_to_writer() {
        let seeded = repository();
        let raw_len = serde_json::to_string(&seeded.get_all().unwrap()).unwrap().len();
        let key_len = seeded.config().storage_key().len();
        let repo = Repository::new(MemoryStore::with_quota(raw_len + key_len), Config::default());
        repo.get_all().unwrap();

        let error = repo.save(new_path("999", "Too big")).unwrap_err();

        assert!(matches!(error, StorageError::QuotaExceeded { .. }));
        assert_eq!(repo.get_all().unwrap().len(), 3);
    }

    #[test]
    fn file_repository_persists_across_instances() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::open(tmp.path().to_path_buf());
        let config = repo.config().clone();

        let path = PathDraft {
            title: "Persisted".to_string(),
            ..PathDraft::default()
        }
        .publish(&config, &repo.get_all().unwrap());
        repo.save(path.clone()).unwrap();

        let reopened = Repository::open(tmp.path().to_path_buf());
        assert_eq!(reopened.get_all().unwrap()[0], path);
        assert!(tmp.path().join("repository-learning-paths.json").exists());
    }

    #[test]
    fn file_repository_recovers_from_invalid_utf8() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("repository-learning-paths.json");
        std::fs::write(&file, [0xff, 0xfe, b'[', b']']).unwrap();
        let repo = Repository::open(tmp.path().to_path_buf());

        assert!(repo.get_all().unwrap().is_empty());

        repo.save(new_path("10", "Recovered")).unwrap();

        let paths = repo.get_all().unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].title, "Recovered");
        assert!(std::str::from_utf8(&std::fs::read(&file).unwrap()).is_ok());
    }

    #[test]
    fn save_rejects_a_nan_rating() {
        let repo = repository();
        let mut path = new_path("10", "Unrated");
        path.rating = f64::NAN;

        let error = repo.save(path).unwrap_err();

        assert!(matches!(error, StorageError::NonFiniteRating { .. }));
        assert_eq!(repo.get_all().unwrap().len(), 3);
    }

    #[test]
    fn search_then_sort_over_seeded_store() {
        let repo = repository();

        let found = query::search(repo.get_all().unwrap(), "javascript");
        let sorted = query::sort(found, query::SortKey::Rating);

        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].title, "Full-Stack Web Development Roadmap");
    }
}
