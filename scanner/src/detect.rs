use crate::fs::StorageRoot;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

/// Entry whose presence marks a directory as a repository root.
pub const VCS_MARKER: &str = ".git";

/// Find repository roots below `root`, depth first in listing order.
///
/// A directory carrying [`VCS_MARKER`] is reported and not descended into,
/// so repositories nested inside another checkout are not reported.
/// Directories that cannot be listed are skipped, and a directory reached
/// a second time through a symlink is only walked once.
pub fn detect_repositories(fs: &dyn StorageRoot, root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut visited = HashSet::new();
    walk(fs, root, &mut visited, &mut found);
    found
}

/// Run [`detect_repositories`] for each root independently and concatenate
/// the results. The same checkout reachable from two roots is reported twice.
pub fn detect_in_roots(fs: &dyn StorageRoot, roots: &[PathBuf]) -> Vec<PathBuf> {
    roots
        .iter()
        .flat_map(|root| detect_repositories(fs, root))
        .collect()
}

fn walk(
    fs: &dyn StorageRoot,
    dir: &Path,
    visited: &mut HashSet<PathBuf>,
    found: &mut Vec<PathBuf>,
) {
    let canonical = fs
        .canonicalize(dir)
        .unwrap_or_else(|_| dir.to_path_buf());
    if !visited.insert(canonical) {
        tracing::debug!("already visited {}, skipping", dir.display());
        return;
    }

    if fs.exists(&dir.join(VCS_MARKER)) {
        found.push(dir.to_path_buf());
        return;
    }

    let entries = match fs.list_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("cannot list {}: {e}", dir.display());
            return;
        }
    };
    for name in entries {
        let child = dir.join(&name);
        if fs.is_dir(&child) {
            walk(fs, &child, visited, found);
        }
    }
}
