//! Resources that point at other learning paths.
//!
//! A linking resource stores the target's id together with a
//! [`LinkedPathPreview`] copied at link time, so it can be rendered without
//! looking the target up. The preview is never synchronised implicitly:
//! [`stale_previews`] reports previews that no longer match their target and
//! [`refresh_preview`] rewrites one on request.
//!
//! Deleting a linked path does not cascade. A link whose target is gone is
//! [`LinkState::Dangling`] and is rendered from the stored preview.

use crate::{
    domain::{LearningPath, LinkedPathPreview, PathId, PathLink, Resource, ResourceTarget},
    storage::StorageError,
};

/// Point `resource` at `target`.
///
/// The preview is populated from the target's current display fields. A blank
/// resource title defaults to the target's title; a title the author already
/// chose is kept.
pub fn link_to(resource: &mut Resource, target: &LearningPath) {
    resource.target = ResourceTarget::Path(PathLink {
        target: target.id.clone(),
        preview: Some(LinkedPathPreview::of(target)),
    });

    if resource.title.trim().is_empty() {
        resource.title.clone_from(&target.title);
    }
}

/// The paths an author may link to while authoring `authoring`.
///
/// Excludes the path being authored. This is an authoring-time rule only;
/// the store accepts self links when they are constructed directly.
pub fn selectable_targets<'a>(
    paths: &'a [LearningPath],
    authoring: &'a PathId,
) -> impl Iterator<Item = &'a LearningPath> + 'a {
    paths.iter().filter(move |path| &path.id != authoring)
}

/// What a path link currently points at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkState<'a> {
    /// No target has been picked yet.
    Unset,
    /// The target exists.
    Live(&'a LearningPath),
    /// The target no longer exists; render from the stored preview.
    Dangling,
}

/// Resolve a link against a snapshot of the collection.
#[must_use]
pub fn resolve<'a>(link: &PathLink, paths: &'a [LearningPath]) -> LinkState<'a> {
    if !link.is_set() {
        return LinkState::Unset;
    }
    paths
        .iter()
        .find(|path| path.id == link.target)
        .map_or(LinkState::Dangling, LinkState::Live)
}

/// A linking resource whose preview no longer matches its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StalePreview {
    /// The path owning the resource.
    pub path: PathId,
    /// The linking resource.
    pub resource: String,
    /// The linked path.
    pub target: PathId,
    /// The preview stored on the resource.
    pub stored: Option<LinkedPathPreview>,
    /// A preview of the target as it is now.
    pub current: LinkedPathPreview,
}

/// A linking resource whose target no longer exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingLink {
    /// The path owning the resource.
    pub path: PathId,
    /// The linking resource.
    pub resource: String,
    /// The missing target.
    pub target: PathId,
}

fn links(paths: &[LearningPath]) -> impl Iterator<Item = (&LearningPath, &Resource, &PathLink)> {
    paths.iter().flat_map(|path| {
        path.resources
            .iter()
            .filter_map(move |resource| resource.as_link().map(|link| (path, resource, link)))
    })
}

/// Find all stale previews in the collection.
///
/// A link without a preview counts as stale. Dangling and unset links are
/// skipped.
#[must_use]
pub fn stale_previews(paths: &[LearningPath]) -> Vec<StalePreview> {
    links(paths)
        .filter_map(|(path, resource, link)| {
            let LinkState::Live(target) = resolve(link, paths) else {
                return None;
            };
            let current = LinkedPathPreview::of(target);
            (link.preview.as_ref() != Some(&current)).then(|| StalePreview {
                path: path.id.clone(),
                resource: resource.id.clone(),
                target: link.target.clone(),
                stored: link.preview.clone(),
                current,
            })
        })
        .collect()
}

/// Find all links whose target no longer exists.
#[must_use]
pub fn dangling_links(paths: &[LearningPath]) -> Vec<DanglingLink> {
    links(paths)
        .filter(|(_, _, link)| resolve(link, paths) == LinkState::Dangling)
        .map(|(path, resource, link)| DanglingLink {
            path: path.id.clone(),
            resource: resource.id.clone(),
            target: link.target.clone(),
        })
        .collect()
}

/// The outcome of refreshing a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshResult {
    /// The preview was rewritten.
    Updated,
    /// The preview already matched the target.
    AlreadyUpToDate,
}

/// Errors raised when linking resources or refreshing previews.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// No path with this id exists.
    #[error("learning path {0} not found")]
    PathNotFound(PathId),
    /// The path has no resource with this id.
    #[error("resource {resource} not found in learning path {path}")]
    ResourceNotFound {
        /// The path searched.
        path: PathId,
        /// The missing resource.
        resource: String,
    },
    /// The link target does not exist.
    #[error("linked learning path {0} not found")]
    TargetNotFound(PathId),
    /// A path cannot link to itself while it is being authored.
    #[error("learning path {0} cannot link to itself")]
    SelfLink(PathId),
    /// The resource is not a link to another path.
    #[error("resource {resource} in learning path {path} is not a learning path link")]
    NotALink {
        /// The path owning the resource.
        path: PathId,
        /// The resource.
        resource: String,
    },
    /// The collection could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

fn find_resource<'a>(
    paths: &'a mut [LearningPath],
    path_id: &str,
    resource_id: &str,
) -> Result<&'a mut Resource, LinkError> {
    let path = paths
        .iter_mut()
        .find(|path| path.id == path_id)
        .ok_or_else(|| LinkError::PathNotFound(PathId::from(path_id)))?;
    let owner = path.id.clone();
    path.resource_mut(resource_id)
        .ok_or_else(|| LinkError::ResourceNotFound {
            path: owner,
            resource: resource_id.to_string(),
        })
}

/// Link a resource of one path to another path, as an author would.
///
/// # Errors
///
/// Fails if the path, resource or target doesn't exist, or if the target is
/// the path owning the resource.
pub fn link_resource(
    paths: &mut [LearningPath],
    path_id: &str,
    resource_id: &str,
    target_id: &str,
) -> Result<(), LinkError> {
    if path_id == target_id {
        return Err(LinkError::SelfLink(PathId::from(path_id)));
    }

    let target = paths
        .iter()
        .find(|path| path.id == target_id)
        .cloned()
        .ok_or_else(|| LinkError::TargetNotFound(PathId::from(target_id)))?;

    let resource = find_resource(paths, path_id, resource_id)?;
    link_to(resource, &target);
    Ok(())
}

/// Rewrite the preview of one linking resource from its target.
///
/// # Errors
///
/// Fails if the path or resource doesn't exist, the resource isn't a set
/// link, or its target no longer exists.
pub fn refresh_preview(
    paths: &mut [LearningPath],
    path_id: &str,
    resource_id: &str,
) -> Result<RefreshResult, LinkError> {
    let (target_id, current) = {
        let resource = find_resource(paths, path_id, resource_id)?;
        let link = resource
            .as_link()
            .filter(|link| link.is_set())
            .ok_or_else(|| LinkError::NotALink {
                path: PathId::from(path_id),
                resource: resource_id.to_string(),
            })?;
        let target_id = link.target.clone();
        let current = paths
            .iter()
            .find(|path| path.id == target_id)
            .map(LinkedPathPreview::of);
        (target_id, current)
    };

    let current = current.ok_or(LinkError::TargetNotFound(target_id))?;

    let link = find_resource(paths, path_id, resource_id)?
        .as_link_mut()
        .ok_or_else(|| LinkError::NotALink {
            path: PathId::from(path_id),
            resource: resource_id.to_string(),
        })?;

    if link.preview.as_ref() == Some(&current) {
        return Ok(RefreshResult::AlreadyUpToDate);
    }
    link.preview = Some(current);
    Ok(RefreshResult::Updated)
}

/// Refresh every stale preview.
///
/// Returns the (path, resource) pairs that were updated.
pub fn refresh_all(paths: &mut [LearningPath]) -> Vec<(PathId, String)> {
    let mut updated = Vec::new();

    for stale in stale_previews(paths) {
        if let Ok(RefreshResult::Updated) =
            refresh_preview(paths, stale.path.as_str(), &stale.resource)
        {
            updated.push((stale.path, stale.resource));
        }
    }

    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{seed::sample_paths, MediaKind, ResourceKind};

    fn blank_link(id: &str) -> Resource {
        let mut resource = Resource::external(id, MediaKind::Website, "", "", "");
        resource.set_kind(ResourceKind::LearningPath);
        resource
    }

    #[test]
    fn link_to_populates_preview_and_default_title() {
        let paths = sample_paths();
        let mut resource = blank_link("r");

        link_to(&mut resource, &paths[1]);

        let link = resource.as_link().unwrap();
        assert_eq!(link.target, paths[1].id);
        assert_eq!(resource.url(), "2");
        assert_eq!(resource.title, "Machine Learning Fundamentals");

        let preview = link.preview.as_ref().unwrap();
        assert_eq!(preview.id.as_str(), resource.url());
        assert_eq!(preview.category.as_deref(), Some("datascience"));
        assert_eq!(preview.difficulty.as_deref(), Some("intermediate"));
        assert_eq!(
            preview.cover_image.as_deref(),
            Some(paths[1].cover_image.as_str())
        );
    }

    #[test]
    fn link_to_keeps_author_title() {
        let paths = sample_paths();
        let mut resource = blank_link("r");
        resource.title = "Then read this".to_string();

        link_to(&mut resource, &paths[0]);

        assert_eq!(resource.title, "Then read this");
    }

    #[test]
    fn selectable_targets_excludes_path_being_authored() {
        let paths = sample_paths();

        let ids: Vec<_> = selectable_targets(&paths, &paths[0].id)
            .map(|path| path.id.as_str())
            .collect();

        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn link_resource_rejects_self_links() {
        let mut paths = sample_paths();

        let error = link_resource(&mut paths, "1", "1-1", "1").unwrap_err();

        assert!(matches!(error, LinkError::SelfLink(id) if id == "1"));
        assert_eq!(paths, sample_paths());
    }

    #[test]
    fn link_resource_rejects_unknown_targets() {
        let mut paths = sample_paths();

        let error = link_resource(&mut paths, "1", "1-1", "999").unwrap_err();

        assert!(matches!(error, LinkError::TargetNotFound(id) if id == "999"));
    }

    #[test]
    fn link_resource_rejects_unknown_resources() {
        let mut paths = sample_paths();

        let error = link_resource(&mut paths, "1", "nope", "2").unwrap_err();

        assert!(matches!(error, LinkError::ResourceNotFound { .. }));
    }

    #[test]
    fn link_resource_overrides_external_target() {
        let mut paths = sample_paths();

        link_resource(&mut paths, "1", "1-2", "3").unwrap();

        let resource = paths[0].resource("1-2").unwrap();
        assert_eq!(resource.kind(), ResourceKind::LearningPath);
        assert_eq!(resource.url(), "3");
        // the resource already had a title
        assert_eq!(resource.title, "JavaScript Fundamentals");
    }

    #[test]
    fn resolve_reports_dangling_links() {
        let mut paths = sample_paths();
        link_resource(&mut paths, "1", "1-1", "3").unwrap();
        let link = paths[0].resource("1-1").unwrap().as_link().unwrap().clone();

        assert!(matches!(resolve(&link, &paths), LinkState::Live(path) if path.id == "3"));

        paths.retain(|path| path.id != "3");

        assert_eq!(resolve(&link, &paths), LinkState::Dangling);
        assert_eq!(
            dangling_links(&paths),
            vec![DanglingLink {
                path: PathId::from("1"),
                resource: "1-1".to_string(),
                target: PathId::from("3"),
            }]
        );
        assert!(stale_previews(&paths).is_empty());
    }

    #[test]
    fn unset_links_resolve_as_unset() {
        let link = PathLink::default();
        assert_eq!(resolve(&link, &sample_paths()), LinkState::Unset);
    }

    #[test]
    fn stale_preview_is_detected_and_refreshed() {
        let mut paths = sample_paths();
        link_resource(&mut paths, "1", "1-1", "2").unwrap();
        assert!(stale_previews(&paths).is_empty());

        paths[1].title = "Machine Learning, Revised".to_string();

        let stale = stale_previews(&paths);
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].path, "1");
        assert_eq!(stale[0].resource, "1-1");
        assert_eq!(
            stale[0].stored.as_ref().unwrap().title,
            "Machine Learning Fundamentals"
        );
        assert_eq!(stale[0].current.title, "Machine Learning, Revised");

        assert_eq!(
            refresh_preview(&mut paths, "1", "1-1").unwrap(),
            RefreshResult::Updated
        );
        assert_eq!(
            refresh_preview(&mut paths, "1", "1-1").unwrap(),
            RefreshResult::AlreadyUpToDate
        );
        assert!(stale_previews(&paths).is_empty());
    }

    #[test]
    fn missing_preview_counts_as_stale() {
        let mut paths = sample_paths();
        paths[0].resources[0].target = ResourceTarget::Path(PathLink {
            target: PathId::from("2"),
            preview: None,
        });

        assert_eq!(stale_previews(&paths).len(), 1);
        assert_eq!(
            refresh_all(&mut paths),
            vec![(PathId::from("1"), "1-1".to_string())]
        );
        assert!(paths[0].resources[0].linked_preview().is_some());
    }

    #[test]
    fn refresh_rejects_external_resources() {
        let mut paths = sample_paths();

        let error = refresh_preview(&mut paths, "1", "1-1").unwrap_err();

        assert!(matches!(error, LinkError::NotALink { .. }));
    }
}
