//! Read-only projections over a registry snapshot: dashboard ordering,
//! search, stats and tag groupings.

use crate::types::Project;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Name,
    #[default]
    LastUpdated,
    Favorites,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_projects: usize,
    pub total_stars: u64,
    pub total_forks: u64,
    pub unique_tags: usize,
    pub languages: BTreeMap<String, usize>,
}

pub fn stats(projects: &[Project]) -> Stats {
    let mut languages = BTreeMap::new();
    let mut tags = BTreeSet::new();
    let mut out = Stats {
        total_projects: projects.len(),
        ..Stats::default()
    };
    for project in projects {
        out.total_stars = out.total_stars.saturating_add(project.stars());
        out.total_forks = out.total_forks.saturating_add(project.forks());
        tags.extend(project.tags().iter().map(String::as_str));
        if let Some(lang) = project.language() {
            *languages.entry(lang.to_string()).or_insert(0) += 1;
        }
    }
    out.unique_tags = tags.len();
    out.languages = languages;
    out
}

/// Projects grouped under every tag they carry.
pub fn tag_groups(projects: &[Project]) -> BTreeMap<&str, Vec<&Project>> {
    let mut groups: BTreeMap<&str, Vec<&Project>> = BTreeMap::new();
    for project in projects {
        for tag in project.tags() {
            let group = groups.entry(tag.as_str()).or_default();
            if !group.iter().any(|p| p.id() == project.id()) {
                group.push(project);
            }
        }
    }
    groups
}

pub fn favorites(projects: &[Project]) -> Vec<&Project> {
    projects.iter().filter(|p| p.is_favorite()).collect()
}

/// Case-insensitive match on name, summary/description and tags. An empty
/// term matches everything.
pub fn search<'a>(projects: &'a [Project], term: &str) -> Vec<&'a Project> {
    let term = term.trim().to_lowercase();
    projects
        .iter()
        .filter(|p| {
            term.is_empty()
                || p.name().to_lowercase().contains(&term)
                || p.summary().to_lowercase().contains(&term)
                || p.tags().iter().any(|t| t.to_lowercase().contains(&term))
        })
        .collect()
}

pub fn sort_projects(projects: &mut [&Project], key: SortKey) {
    match key {
        SortKey::Name => projects.sort_by(|a, b| a.name().cmp(b.name())),
        SortKey::LastUpdated => projects.sort_by_key(|p| std::cmp::Reverse(p.last_updated())),
        SortKey::Favorites => projects.sort_by_key(|p| !p.is_favorite()),
    }
}

/// Favorites first, otherwise keeping registry order.
pub fn dashboard_order(projects: &[Project]) -> Vec<&Project> {
    let mut out: Vec<&Project> = projects.iter().collect();
    out.sort_by_key(|p| !p.is_favorite());
    out
}
