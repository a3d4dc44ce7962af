//! Best-effort metadata for a single project directory.

use crate::error::ScanError;
use crate::fs::StorageRoot;
use crate::summary;
use chrono::Utc;
use devdeck_registry::LocalProject;
use devdeck_registry::ProjectId;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// README file names, compared case-insensitively.
pub const README_NAMES: [&str; 3] = ["readme.md", "readme.txt", "readme"];

/// How many dependency names a manifest contributes as tags.
pub const MANIFEST_TAG_LIMIT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestInfo {
    pub tags: Vec<String>,
    pub git_url: Option<String>,
}

impl ManifestInfo {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.git_url.is_none()
    }
}

#[allow(clippy::expect_used)]
static GIT_CONFIG_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)url\s*=\s*(.+)").expect("git config pattern is valid"));

/// Build a [`LocalProject`] for `dir`.
///
/// Only a missing or unlistable directory is an error. README, manifest and
/// git config problems are logged and the affected fields left empty.
pub fn extract_project(fs: &dyn StorageRoot, dir: &Path) -> Result<LocalProject, ScanError> {
    if !fs.exists(dir) {
        return Err(ScanError::NotFound(dir.to_path_buf()));
    }
    let files = fs.list_dir(dir).map_err(|source| ScanError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string());

    let mut readme = None;
    let mut summary_text = String::new();
    if let Some(readme_file) = files
        .iter()
        .find(|f| README_NAMES.contains(&f.to_lowercase().as_str()))
    {
        match fs.read_to_string(&dir.join(readme_file)) {
            Ok(content) => {
                let parsed = summary::parse_readme(&content);
                readme = Some(parsed.html);
                summary_text = parsed.summary;
            }
            Err(e) => tracing::warn!("cannot read {}: {e}", dir.join(readme_file).display()),
        }
    }

    let manifest = read_manifest(fs, dir, &files).unwrap_or_default();
    let mut git_url = manifest.git_url;
    if git_url.is_none() && files.iter().any(|f| f == crate::detect::VCS_MARKER) {
        let config = dir.join(crate::detect::VCS_MARKER).join("config");
        match fs.read_to_string(&config) {
            Ok(text) => git_url = git_remote_url(&text),
            Err(e) => tracing::debug!("cannot read {}: {e}", config.display()),
        }
    }

    if summary_text.is_empty() {
        summary_text = format!("Project located at {}", dir.display());
    }

    Ok(LocalProject {
        id: ProjectId::new(),
        name,
        path: dir.to_path_buf(),
        summary: summary_text,
        readme,
        tags: manifest.tags,
        is_favorite: false,
        last_updated: Utc::now(),
        git_url,
        screenshots: Vec::new(),
    })
}

/// The first manifest that contributes tags or a repository URL wins.
fn read_manifest(fs: &dyn StorageRoot, dir: &Path, files: &[String]) -> Option<ManifestInfo> {
    let parsers: [(&str, fn(&str) -> Option<ManifestInfo>); 2] = [
        ("package.json", parse_package_json),
        ("Cargo.toml", parse_cargo_toml),
    ];
    for (name, parse) in parsers {
        if !files.iter().any(|f| f == name) {
            continue;
        }
        let path = dir.join(name);
        match fs.read_to_string(&path).map(|text| parse(&text)) {
            Ok(Some(info)) if !info.is_empty() => return Some(info),
            Ok(Some(_)) => tracing::debug!("{} has no dependencies or repository", path.display()),
            Ok(None) => tracing::warn!("ignoring unparseable {}", path.display()),
            Err(e) => tracing::warn!("cannot read {}: {e}", path.display()),
        }
    }
    None
}

/// Tags from `dependencies` followed by `devDependencies`, in file order,
/// and the `repository` field as a string or `{ "url": ... }`.
pub fn parse_package_json(text: &str) -> Option<ManifestInfo> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let object = value.as_object()?;

    let mut tags: Vec<String> = Vec::new();
    for section in ["dependencies", "devDependencies"] {
        let Some(deps) = object.get(section).and_then(|d| d.as_object()) else {
            continue;
        };
        for key in deps.keys() {
            if !tags.contains(key) {
                tags.push(key.clone());
            }
        }
    }
    tags.truncate(MANIFEST_TAG_LIMIT);

    let git_url = match object.get("repository") {
        Some(serde_json::Value::String(url)) => Some(url.clone()),
        Some(serde_json::Value::Object(repo)) => repo
            .get("url")
            .and_then(|u| u.as_str())
            .map(str::to_string),
        _ => None,
    };
    Some(ManifestInfo { tags, git_url })
}

/// Tags from `[dependencies]` followed by `[dev-dependencies]`, and
/// `package.repository`.
pub fn parse_cargo_toml(text: &str) -> Option<ManifestInfo> {
    let table: toml::Table = toml::from_str(text).ok()?;

    let mut tags: Vec<String> = Vec::new();
    for section in ["dependencies", "dev-dependencies"] {
        let Some(deps) = table.get(section).and_then(|d| d.as_table()) else {
            continue;
        };
        for key in deps.keys() {
            if !tags.contains(key) {
                tags.push(key.clone());
            }
        }
    }
    tags.truncate(MANIFEST_TAG_LIMIT);

    let git_url = table
        .get("package")
        .and_then(|p| p.get("repository"))
        .and_then(|r| r.as_str())
        .map(str::to_string);
    Some(ManifestInfo { tags, git_url })
}

/// First `url = ...` assignment in a git config file.
pub fn git_remote_url(config: &str) -> Option<String> {
    GIT_CONFIG_URL
        .captures(config)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|url| !url.is_empty())
}
