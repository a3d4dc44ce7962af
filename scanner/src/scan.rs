//! Scan drivers. Each processes its items one at a time, in order, and keeps
//! going past per-item failures, which are collected in the [`ScanReport`].

use crate::detect::detect_repositories;
use crate::error::ScanError;
use crate::extract::extract_project;
use crate::fs::StorageRoot;
use devdeck_registry::MergeOutcome;
use devdeck_registry::Project;
use devdeck_registry::ProjectId;
use devdeck_registry::Registry;
use std::path::Path;
use std::path::PathBuf;

#[derive(Debug)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub error: ScanError,
}

#[derive(Debug, Default)]
pub struct ScanReport {
    /// Repository roots found by the detector (rescans count every project).
    pub discovered: usize,
    pub inserted: Vec<ProjectId>,
    pub updated: Vec<ProjectId>,
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    fn record(&mut self, outcome: MergeOutcome) {
        match outcome {
            MergeOutcome::Inserted(id) => self.inserted.push(id),
            MergeOutcome::Updated(id) => self.updated.push(id),
        }
    }

    fn fail(&mut self, path: &Path, error: ScanError) {
        tracing::warn!("skipping {}: {error}", path.display());
        self.failures.push(ScanFailure {
            path: path.to_path_buf(),
            error,
        });
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Discover repositories below every root and merge them into `registry`.
pub fn scan_folders(
    fs: &dyn StorageRoot,
    registry: &mut Registry,
    roots: &[PathBuf],
) -> ScanReport {
    let mut report = ScanReport::default();
    for root in roots {
        if !fs.is_dir(root) {
            report.fail(root, ScanError::NotFound(root.clone()));
            continue;
        }
        let repos = detect_repositories(fs, root);
        tracing::info!("found {} repositories under {}", repos.len(), root.display());
        report.discovered += repos.len();
        for repo in repos {
            match extract_project(fs, &repo) {
                Ok(project) => report.record(registry.add_or_update(Project::Local(project))),
                Err(e) => report.fail(&repo, e),
            }
        }
    }
    report
}

/// Re-extract every known local project, keeping id, favorite flag,
/// screenshots and tags.
pub fn rescan_projects(fs: &dyn StorageRoot, registry: &mut Registry) -> ScanReport {
    let mut report = ScanReport::default();
    let snapshot = registry.snapshot();
    for existing in snapshot.iter() {
        let Some(path) = existing.path() else {
            continue;
        };
        report.discovered += 1;
        match extract_project(fs, path) {
            Ok(fresh) => report.record(registry.rescan_preserving(existing, Project::Local(fresh))),
            Err(e) => report.fail(path, e),
        }
    }
    report
}

/// Register a single directory. Errors are returned to the caller rather
/// than collected.
pub fn add_local_project(
    fs: &dyn StorageRoot,
    registry: &mut Registry,
    path: &Path,
) -> Result<MergeOutcome, ScanError> {
    let project = extract_project(fs, path)?;
    Ok(registry.add_or_update(Project::Local(project)))
}
