//! Registering a cloned repository.
//!
//! Fetching is not done here: the checkout at `dest` must already exist
//! (typically produced by running `git clone` beforehand). The remote URL
//! given by the caller is recorded as the project's git URL.

use crate::error::ScanError;
use crate::extract::extract_project;
use crate::fs::StorageRoot;
use devdeck_registry::MergeOutcome;
use devdeck_registry::Project;
use devdeck_registry::Registry;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static GIT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://|git@)([^\s:]+)(:|/)[^\s]+$").expect("git url pattern is valid")
});

/// Accepts `http(s)://host/path` and scp-style `git@host:path` URLs.
pub fn is_valid_git_url(url: &str) -> bool {
    GIT_URL.is_match(url.trim())
}

pub fn register_clone(
    fs: &dyn StorageRoot,
    registry: &mut Registry,
    url: &str,
    dest: &Path,
) -> Result<MergeOutcome, ScanError> {
    let url = url.trim();
    if !is_valid_git_url(url) {
        return Err(ScanError::InvalidUrl(url.to_string()));
    }
    if !fs.is_dir(dest) {
        return Err(ScanError::Unsupported(format!(
            "no checkout at {}; clone {url} there first",
            dest.display()
        )));
    }

    let mut project = extract_project(fs, dest)?;
    project.git_url = Some(url.to_string());
    tracing::info!("registering clone of {url} at {}", dest.display());
    Ok(registry.add_or_update(Project::Local(project)))
}
