//! The project registry: the single place where the project collection is
//! mutated.
//!
//! Every mutation publishes a fresh snapshot. A snapshot handed out by
//! [`Registry::snapshot`] is never changed afterwards; the next write clones
//! the collection if a reader still holds the old one.

use crate::error::RegistryError;
use crate::error::Result;
use crate::types::DedupKey;
use crate::types::Project;
use crate::types::ProjectId;
use crate::types::ProjectUpdate;
use crate::types::Screenshot;
use chrono::DateTime;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

pub type Clock = fn() -> DateTime<Utc>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted(ProjectId),
    Updated(ProjectId),
}

impl MergeOutcome {
    pub fn id(&self) -> ProjectId {
        match self {
            MergeOutcome::Inserted(id) | MergeOutcome::Updated(id) => *id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Registry {
    projects: Arc<Vec<Project>>,
    clock: Clock,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            projects: Arc::new(Vec::new()),
            clock: Utc::now,
        }
    }

    /// Build a registry from persisted projects. Entries that repeat an id or
    /// a de-duplication key already seen are dropped, first one wins.
    pub fn from_projects(projects: Vec<Project>) -> Self {
        let mut keys = HashSet::new();
        let mut ids = HashSet::new();
        let mut kept = Vec::with_capacity(projects.len());
        for project in projects {
            if !ids.insert(project.id()) || !keys.insert(project.dedup_key()) {
                tracing::warn!(
                    "dropping duplicate project {} ({})",
                    project.id(),
                    project.dedup_key()
                );
                continue;
            }
            kept.push(project);
        }
        Self {
            projects: Arc::new(kept),
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn snapshot(&self) -> Arc<Vec<Project>> {
        Arc::clone(&self.projects)
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn get(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id() == id)
    }

    pub fn find_by_key(&self, key: &DedupKey) -> Option<&Project> {
        self.projects.iter().find(|p| &p.dedup_key() == key)
    }

    /// Resolve a full id or a unique id prefix.
    pub fn resolve(&self, needle: &str) -> Result<ProjectId> {
        let needle = needle.trim().to_ascii_lowercase();
        let mut matches = self
            .projects
            .iter()
            .map(Project::id)
            .filter(|id| !needle.is_empty() && id.to_string().starts_with(&needle));
        match (matches.next(), matches.next()) {
            (Some(id), None) => Ok(id),
            (Some(_), Some(_)) => Err(RegistryError::Ambiguous(needle)),
            (None, _) => Err(RegistryError::NotFound(needle)),
        }
    }

    /// Insert `candidate`, or merge it into the entry sharing its
    /// de-duplication key. A merge takes the source-derived fields from the
    /// candidate and keeps id, favorite flag, tags and screenshots of the
    /// existing entry.
    pub fn add_or_update(&mut self, mut candidate: Project) -> MergeOutcome {
        let key = candidate.dedup_key();
        let now = (self.clock)();
        let projects = Arc::make_mut(&mut self.projects);

        if let Some(slot) = projects.iter_mut().find(|p| p.dedup_key() == key) {
            candidate.carry_user_fields(slot);
            candidate.set_last_updated(now);
            let id = candidate.id();
            *slot = candidate;
            tracing::debug!("updated project {id} ({key})");
            return MergeOutcome::Updated(id);
        }

        if projects.iter().any(|p| p.id() == candidate.id()) {
            let fresh = ProjectId::new();
            tracing::warn!(
                "project id {} already in use, assigning {fresh} to {key}",
                candidate.id()
            );
            candidate.set_id(fresh);
        }
        let id = candidate.id();
        projects.push(candidate);
        tracing::debug!("inserted project {id} ({key})");
        MergeOutcome::Inserted(id)
    }

    /// Merge a freshly scanned copy of `existing`. The fresh id is discarded
    /// in favour of the original one; screenshots and the favorite flag
    /// carry over as well.
    pub fn rescan_preserving(&mut self, existing: &Project, mut fresh: Project) -> MergeOutcome {
        fresh.set_id(existing.id());
        fresh.set_favorite(existing.is_favorite());
        fresh.set_screenshots(existing.screenshots().to_vec());
        self.add_or_update(fresh)
    }

    /// Flip the favorite flag and return its new value.
    pub fn toggle_favorite(&mut self, id: ProjectId) -> Result<bool> {
        self.modify(id, |project| {
            let value = !project.is_favorite();
            project.set_favorite(value);
            value
        })
    }

    pub fn update(&mut self, id: ProjectId, update: ProjectUpdate) -> Result<()> {
        self.modify(id, |project| {
            let ProjectUpdate {
                summary,
                tags,
                screenshots,
            } = update;
            if let Some(summary) = summary {
                project.set_summary(summary);
            }
            if let Some(tags) = tags {
                *project.tags_mut() = tags;
            }
            if let Some(screenshots) = screenshots {
                project.set_screenshots(screenshots);
            }
        })
    }

    /// Append a tag unless the project already carries it. Blank tags are
    /// ignored. Returns whether the tag list changed.
    pub fn add_tag(&mut self, id: ProjectId, tag: &str) -> Result<bool> {
        let tag = tag.trim();
        if tag.is_empty() {
            self.position(id)?;
            return Ok(false);
        }
        self.modify(id, |project| {
            let tags = project.tags_mut();
            if tags.iter().any(|t| t == tag) {
                return false;
            }
            tags.push(tag.to_string());
            true
        })
    }

    pub fn remove_tag(&mut self, id: ProjectId, tag: &str) -> Result<bool> {
        self.modify(id, |project| {
            let tags = project.tags_mut();
            let before = tags.len();
            tags.retain(|t| t != tag);
            tags.len() != before
        })
    }

    pub fn add_screenshot(&mut self, id: ProjectId, screenshot: Screenshot) -> Result<()> {
        self.modify(id, |project| {
            let mut shots = project.screenshots().to_vec();
            shots.push(screenshot);
            project.set_screenshots(shots);
        })
    }

    /// Drop one screenshot reference. The image file itself is left alone.
    pub fn remove_screenshot(&mut self, id: ProjectId, screenshot: Uuid) -> Result<()> {
        let idx = self.position(id)?;
        if !self.projects[idx].screenshots().iter().any(|s| s.id == screenshot) {
            return Err(RegistryError::ScreenshotNotFound {
                project: id,
                screenshot,
            });
        }
        self.modify(id, |project| {
            let shots = project
                .screenshots()
                .iter()
                .filter(|s| s.id != screenshot)
                .cloned()
                .collect();
            project.set_screenshots(shots);
        })
    }

    /// Remove a project. Referenced screenshot files are not deleted.
    pub fn remove(&mut self, id: ProjectId) -> Result<Project> {
        let idx = self.position(id)?;
        let projects = Arc::make_mut(&mut self.projects);
        Ok(projects.remove(idx))
    }

    fn position(&self, id: ProjectId) -> Result<usize> {
        self.projects
            .iter()
            .position(|p| p.id() == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    fn modify<R>(&mut self, id: ProjectId, f: impl FnOnce(&mut Project) -> R) -> Result<R> {
        let idx = self.position(id)?;
        let now = (self.clock)();
        let project = &mut Arc::make_mut(&mut self.projects)[idx];
        let out = f(project);
        project.set_last_updated(now);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LocalProject;
    use crate::types::RemoteProject;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn epoch_2020() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn remote(url: &str, stars: u64, description: &str) -> Project {
        Project::Remote(RemoteProject {
            id: ProjectId::new(),
            owner: "vercel".into(),
            name: "next.js".into(),
            description: description.into(),
            language: Some("JavaScript".into()),
            repo_url: url.into(),
            stars,
            forks: 10,
            watchers: 5,
            tags: vec![],
            is_favorite: false,
            last_updated: epoch_2020(),
            created_at: epoch_2020(),
            screenshot: None,
        })
    }

    fn local(path: &str, summary: &str) -> Project {
        Project::Local(LocalProject {
            id: ProjectId::new(),
            name: "demo".into(),
            path: PathBuf::from(path),
            summary: summary.into(),
            readme: None,
            tags: vec!["serde".into()],
            is_favorite: false,
            last_updated: epoch_2020(),
            git_url: None,
            screenshots: vec![],
        })
    }

    #[test]
    fn add_or_update_same_repo_url_keeps_one_entry_and_id() {
        let mut registry = Registry::new();
        let first = registry.add_or_update(remote("https://github.com/vercel/next.js", 1, "a"));
        let second = registry.add_or_update(remote("https://github.com/vercel/next.js", 2, "b"));

        assert_eq!(registry.len(), 1);
        assert!(matches!(first, MergeOutcome::Inserted(_)));
        assert_eq!(second, MergeOutcome::Updated(first.id()));
        assert_eq!(registry.projects()[0].id(), first.id());
    }

    #[test]
    fn merge_preserves_user_fields_and_refreshes_source_fields() {
        let mut registry = Registry::new().with_clock(fixed_clock);
        let id = registry
            .add_or_update(remote("https://github.com/vercel/next.js", 1, "old"))
            .id();
        registry.toggle_favorite(id).unwrap();
        registry
            .update(
                id,
                ProjectUpdate {
                    tags: Some(vec!["a".into(), "b".into()]),
                    ..Default::default()
                },
            )
            .unwrap();
        let shot = Screenshot::new(Some("landing".into()), Some("/shots/next.png".into()));
        registry.add_screenshot(id, shot.clone()).unwrap();

        registry.add_or_update(remote("https://github.com/vercel/next.js", 120_000, "new"));

        let Some(Project::Remote(p)) = registry.get(id) else {
            panic!("remote project missing");
        };
        assert!(p.is_favorite);
        assert_eq!(p.tags, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(p.screenshot.as_ref(), Some(&shot));
        assert_eq!(p.stars, 120_000);
        assert_eq!(p.description, "new");
        assert_eq!(p.last_updated, fixed_clock());
    }

    #[test]
    fn insert_keeps_candidate_as_is() {
        let mut registry = Registry::new().with_clock(fixed_clock);
        let candidate = local("/src/demo", "hello");
        let expected = candidate.clone();
        registry.add_or_update(candidate);
        assert_eq!(registry.projects(), &[expected]);
    }

    #[test]
    fn remote_and_local_keys_never_collide() {
        let mut registry = Registry::new();
        registry.add_or_update(remote("/src/demo", 1, "x"));
        registry.add_or_update(local("/src/demo", "y"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn colliding_id_on_insert_gets_fresh_identity() {
        let mut registry = Registry::new();
        let first = local("/src/a", "a");
        let mut second = local("/src/b", "b");
        second.set_id(first.id());
        let a = registry.add_or_update(first);
        let b = registry.add_or_update(second);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn rescan_discards_fresh_id_and_keeps_favorite_and_screenshots() {
        let mut registry = Registry::new();
        let id = registry.add_or_update(local("/src/demo", "old")).id();
        registry.toggle_favorite(id).unwrap();
        registry
            .add_screenshot(id, Screenshot::new(Some("home".into()), Some("/tmp/a.png".into())))
            .unwrap();
        let existing = registry.get(id).cloned().unwrap();

        let fresh = local("/src/demo", "new summary");
        let fresh_id = fresh.id();
        let outcome = registry.rescan_preserving(&existing, fresh);

        assert_eq!(outcome, MergeOutcome::Updated(id));
        assert_ne!(fresh_id, id);
        let project = registry.get(id).unwrap();
        assert!(project.is_favorite());
        assert_eq!(project.summary(), "new summary");
        assert_eq!(project.screenshots().len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_id_is_not_found_and_changes_nothing() {
        let mut registry = Registry::new();
        registry.add_or_update(local("/src/demo", "x"));
        let before = registry.snapshot();
        let missing = ProjectId::new();

        assert!(matches!(
            registry.toggle_favorite(missing),
            Err(RegistryError::NotFound(_))
        ));
        assert!(matches!(
            registry.update(missing, ProjectUpdate::default()),
            Err(RegistryError::NotFound(_))
        ));
        assert!(matches!(
            registry.remove(missing),
            Err(RegistryError::NotFound(_))
        ));
        assert_eq!(registry.projects(), before.as_slice());
    }

    #[test]
    fn snapshots_are_not_mutated_by_later_writes() {
        let mut registry = Registry::new();
        let id = registry.add_or_update(local("/src/demo", "x")).id();
        let snapshot = registry.snapshot();
        registry.toggle_favorite(id).unwrap();
        assert!(!snapshot[0].is_favorite());
        assert!(registry.get(id).unwrap().is_favorite());
    }

    #[test]
    fn update_on_remote_maps_summary_and_keeps_last_screenshot() {
        let mut registry = Registry::new();
        let id = registry
            .add_or_update(remote("https://github.com/a/b", 1, "x"))
            .id();
        let first = Screenshot::new(None, Some("one.png".into()));
        let second = Screenshot::new(None, Some("two.png".into()));
        registry
            .update(
                id,
                ProjectUpdate {
                    summary: Some("described".into()),
                    screenshots: Some(vec![first, second.clone()]),
                    ..Default::default()
                },
            )
            .unwrap();
        let project = registry.get(id).unwrap();
        assert_eq!(project.summary(), "described");
        assert_eq!(project.screenshots(), &[second]);
    }

    #[test]
    fn remove_screenshot_requires_existing_reference() {
        let mut registry = Registry::new();
        let id = registry.add_or_update(local("/src/demo", "x")).id();
        let shot = Screenshot::new(None, None);
        let shot_id = shot.id;
        registry.add_screenshot(id, shot).unwrap();

        assert!(matches!(
            registry.remove_screenshot(id, Uuid::new_v4()),
            Err(RegistryError::ScreenshotNotFound { .. })
        ));
        registry.remove_screenshot(id, shot_id).unwrap();
        assert!(registry.get(id).unwrap().screenshots().is_empty());
    }

    #[test]
    fn tags_add_is_idempotent_and_remove_reports_change() {
        let mut registry = Registry::new();
        let id = registry.add_or_update(local("/src/demo", "x")).id();
        assert!(registry.add_tag(id, "cli").unwrap());
        assert!(!registry.add_tag(id, "cli").unwrap());
        assert!(registry.remove_tag(id, "serde").unwrap());
        assert!(!registry.remove_tag(id, "serde").unwrap());
        assert!(!registry.add_tag(id, "").unwrap());
        assert!(!registry.add_tag(id, "   ").unwrap());
        assert_eq!(registry.get(id).unwrap().tags(), &["cli".to_string()]);
    }

    #[test]
    fn resolve_accepts_unique_prefix() {
        let mut registry = Registry::new();
        let id = registry.add_or_update(local("/src/demo", "x")).id();
        let full = id.to_string();
        assert_eq!(registry.resolve(&full[..8]).unwrap(), id);
        assert!(matches!(
            registry.resolve("zzzz"),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn from_projects_drops_duplicate_keys() {
        let registry =
            Registry::from_projects(vec![local("/src/demo", "first"), local("/src/demo", "second")]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.projects()[0].summary(), "first");
    }
}
