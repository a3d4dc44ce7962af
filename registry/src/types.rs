use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque project identity. Assigned once, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(Uuid);

impl ProjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ProjectId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ProjectId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Screenshot {
    pub id: Uuid,
    pub name: Option<String>,
    pub path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Screenshot {
    pub fn new(name: Option<String>, path: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            path,
            created_at: Utc::now(),
        }
    }
}

/// A repository imported from GitHub by URL.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteProject {
    pub id: ProjectId,
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub language: Option<String>,
    pub repo_url: String,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub screenshot: Option<Screenshot>,
}

/// A directory discovered on the local filesystem.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalProject {
    pub id: ProjectId,
    pub name: String,
    pub path: PathBuf,
    pub summary: String,
    /// README rendered to HTML.
    pub readme: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    pub last_updated: DateTime<Utc>,
    pub git_url: Option<String>,
    #[serde(default)]
    pub screenshots: Vec<Screenshot>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Project {
    Remote(RemoteProject),
    Local(LocalProject),
}

/// Field used by the registry to decide whether two projects are the same.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DedupKey {
    RepoUrl(String),
    Path(PathBuf),
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupKey::RepoUrl(url) => write!(f, "{url}"),
            DedupKey::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

impl Project {
    pub fn id(&self) -> ProjectId {
        match self {
            Project::Remote(p) => p.id,
            Project::Local(p) => p.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Project::Remote(p) => &p.name,
            Project::Local(p) => &p.name,
        }
    }

    /// Description for remote projects, summary for local ones.
    pub fn summary(&self) -> &str {
        match self {
            Project::Remote(p) => &p.description,
            Project::Local(p) => &p.summary,
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            Project::Remote(p) => &p.tags,
            Project::Local(p) => &p.tags,
        }
    }

    pub fn is_favorite(&self) -> bool {
        match self {
            Project::Remote(p) => p.is_favorite,
            Project::Local(p) => p.is_favorite,
        }
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        match self {
            Project::Remote(p) => p.last_updated,
            Project::Local(p) => p.last_updated,
        }
    }

    pub fn language(&self) -> Option<&str> {
        match self {
            Project::Remote(p) => p.language.as_deref(),
            Project::Local(_) => None,
        }
    }

    pub fn stars(&self) -> u64 {
        match self {
            Project::Remote(p) => p.stars,
            Project::Local(_) => 0,
        }
    }

    pub fn forks(&self) -> u64 {
        match self {
            Project::Remote(p) => p.forks,
            Project::Local(_) => 0,
        }
    }

    pub fn screenshots(&self) -> &[Screenshot] {
        match self {
            Project::Remote(p) => p.screenshot.as_slice(),
            Project::Local(p) => &p.screenshots,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Project::Remote(_) => None,
            Project::Local(p) => Some(&p.path),
        }
    }

    pub fn dedup_key(&self) -> DedupKey {
        match self {
            Project::Remote(p) => DedupKey::RepoUrl(p.repo_url.clone()),
            Project::Local(p) => DedupKey::Path(p.path.clone()),
        }
    }

    pub(crate) fn set_id(&mut self, id: ProjectId) {
        match self {
            Project::Remote(p) => p.id = id,
            Project::Local(p) => p.id = id,
        }
    }

    pub(crate) fn set_favorite(&mut self, value: bool) {
        match self {
            Project::Remote(p) => p.is_favorite = value,
            Project::Local(p) => p.is_favorite = value,
        }
    }

    pub(crate) fn set_last_updated(&mut self, at: DateTime<Utc>) {
        match self {
            Project::Remote(p) => p.last_updated = at,
            Project::Local(p) => p.last_updated = at,
        }
    }

    pub(crate) fn set_summary(&mut self, text: String) {
        match self {
            Project::Remote(p) => p.description = text,
            Project::Local(p) => p.summary = text,
        }
    }

    pub(crate) fn tags_mut(&mut self) -> &mut Vec<String> {
        match self {
            Project::Remote(p) => &mut p.tags,
            Project::Local(p) => &mut p.tags,
        }
    }

    /// Remote projects hold a single screenshot; the last one wins.
    pub(crate) fn set_screenshots(&mut self, mut shots: Vec<Screenshot>) {
        match self {
            Project::Remote(p) => p.screenshot = shots.pop(),
            Project::Local(p) => p.screenshots = shots,
        }
    }

    /// Copy the user-owned fields (id, favorite flag, tags, screenshots)
    /// from `existing` onto `self`.
    pub(crate) fn carry_user_fields(&mut self, existing: &Project) {
        self.set_id(existing.id());
        self.set_favorite(existing.is_favorite());
        *self.tags_mut() = existing.tags().to_vec();
        self.set_screenshots(existing.screenshots().to_vec());
    }
}

impl From<RemoteProject> for Project {
    fn from(value: RemoteProject) -> Self {
        Project::Remote(value)
    }
}

impl From<LocalProject> for Project {
    fn from(value: LocalProject) -> Self {
        Project::Local(value)
    }
}

/// Partial update applied by [`crate::registry::Registry::update`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectUpdate {
    /// Replaces the summary of local projects or the description of remote ones.
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
    pub screenshots: Option<Vec<Screenshot>>,
}

impl ProjectUpdate {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.tags.is_none() && self.screenshots.is_none()
    }
}
