//! Upgrades for the persisted state blob.
//!
//! Besides the current versioned layout, [`upgrade_blob`] accepts the
//! unversioned camelCase layout written by the earlier dashboard, either
//! wrapped in a `{"state": ...}` envelope or bare.

use crate::store::PersistedState;
use crate::store::SCHEMA_VERSION;
use crate::types::LocalProject;
use crate::types::Project;
use crate::types::ProjectId;
use crate::types::RemoteProject;
use crate::types::Screenshot;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use std::path::PathBuf;
use uuid::Uuid;

/// Turn any known blob layout into the current [`PersistedState`].
pub fn upgrade_blob(value: serde_json::Value) -> anyhow::Result<PersistedState> {
    if let Some(version) = value.get("schema_version").and_then(|v| v.as_u64()) {
        if version > u64::from(SCHEMA_VERSION) {
            anyhow::bail!(
                "state blob has schema version {version}, newer than supported {SCHEMA_VERSION}"
            );
        }
        return Ok(serde_json::from_value(value)?);
    }

    let legacy = match value.get("state") {
        Some(inner) if inner.is_object() => inner.clone(),
        _ => value,
    };
    if !legacy.is_object() {
        anyhow::bail!("state blob is not a JSON object");
    }
    let legacy: LegacyState = serde_json::from_value(legacy)?;
    tracing::info!(
        "upgrading unversioned state blob with {} projects",
        legacy.projects.len()
    );
    Ok(PersistedState {
        schema_version: SCHEMA_VERSION,
        projects: legacy.projects.into_iter().map(Project::from).collect(),
        scan_locations: legacy.scan_locations,
        auto_scan_on_startup: legacy.auto_scan_on_startup,
    })
}

/// Copy the state kept in a JSON file into a SQLite database file.
///
/// Returns the number of projects written.
#[cfg(feature = "sqlite")]
pub fn migrate_json_to_sqlite(
    json_path: &std::path::Path,
    sqlite_path: &std::path::Path,
) -> anyhow::Result<usize> {
    use crate::store::StateStore;
    use crate::store::json::JsonStateStore;
    use crate::store::sqlite::SqliteStateStore;

    let Some(state) = JsonStateStore::new(json_path).load()? else {
        anyhow::bail!("no state found in {}", json_path.display());
    };
    if let Some(dir) = sqlite_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    SqliteStateStore::new(sqlite_path).save(&state)?;
    Ok(state.projects.len())
}

#[cfg(not(feature = "sqlite"))]
pub fn migrate_json_to_sqlite(
    _json_path: &std::path::Path,
    _sqlite_path: &std::path::Path,
) -> anyhow::Result<usize> {
    anyhow::bail!("sqlite backend not compiled; enable with `--features devdeck-registry/sqlite`");
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyState {
    #[serde(default)]
    projects: Vec<LegacyProject>,
    #[serde(default)]
    scan_locations: Vec<PathBuf>,
    #[serde(default)]
    auto_scan_on_startup: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LegacyProject {
    Local(LegacyLocal),
    Remote(LegacyRemote),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyRemote {
    #[serde(default)]
    id: String,
    name: String,
    owner: String,
    #[serde(default)]
    description: Option<String>,
    repo_url: String,
    #[serde(default)]
    stars: u64,
    #[serde(default)]
    forks: u64,
    #[serde(default)]
    watchers: u64,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    is_favorite: bool,
    #[serde(default = "Utc::now")]
    last_updated: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
    #[serde(default)]
    screenshot: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyLocal {
    #[serde(default)]
    id: String,
    name: String,
    path: PathBuf,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    readme: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    is_favorite: bool,
    #[serde(default = "Utc::now")]
    last_updated: DateTime<Utc>,
    #[serde(default)]
    git_url: Option<String>,
    #[serde(default)]
    screenshots: Vec<LegacyScreenshot>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyScreenshot {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
}

fn legacy_uuid(raw: &str) -> Uuid {
    Uuid::parse_str(raw).unwrap_or_else(|_| Uuid::new_v4())
}

impl From<LegacyProject> for Project {
    fn from(value: LegacyProject) -> Self {
        match value {
            LegacyProject::Remote(p) => Project::Remote(RemoteProject {
                id: ProjectId::from(legacy_uuid(&p.id)),
                owner: p.owner,
                name: p.name,
                description: p.description.unwrap_or_default(),
                language: p.language,
                repo_url: p.repo_url,
                stars: p.stars,
                forks: p.forks,
                watchers: p.watchers,
                tags: p.tags,
                is_favorite: p.is_favorite,
                last_updated: p.last_updated,
                created_at: p.created_at,
                screenshot: p.screenshot.map(|path| Screenshot {
                    id: Uuid::new_v4(),
                    name: None,
                    path: Some(path),
                    created_at: p.last_updated,
                }),
            }),
            LegacyProject::Local(p) => Project::Local(LocalProject {
                id: ProjectId::from(legacy_uuid(&p.id)),
                name: p.name,
                path: p.path,
                summary: p.summary,
                readme: p.readme,
                tags: p.tags,
                is_favorite: p.is_favorite,
                last_updated: p.last_updated,
                git_url: p.git_url,
                screenshots: p
                    .screenshots
                    .into_iter()
                    .map(|s| Screenshot {
                        id: legacy_uuid(&s.id),
                        name: s.name,
                        path: s.path,
                        created_at: s.created_at,
                    })
                    .collect(),
            }),
        }
    }
}
