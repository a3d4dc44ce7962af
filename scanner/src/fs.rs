//! Filesystem access used by the scanner.
//!
//! Everything the detector and extractor touch goes through [`StorageRoot`].
//! [`LocalFs`] is the real filesystem; unit tests use an in-memory tree.

#[cfg(test)]
use std::collections::BTreeMap;
use std::io;
#[cfg(test)]
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

pub trait StorageRoot {
    /// Names of the entries directly inside `path`.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>>;
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl StorageRoot for LocalFs {
    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        // read_dir order is platform dependent
        names.sort();
        Ok(names)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }
}

#[cfg(test)]
#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(String),
    Unreadable,
    Link(PathBuf),
}

/// In-memory directory tree. Paths are absolute; parents are created
/// implicitly.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryFs {
    nodes: BTreeMap<PathBuf, Node>,
}

#[cfg(test)]
impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dir(mut self, path: impl AsRef<Path>) -> Self {
        self.insert(path.as_ref(), Node::Dir);
        self
    }

    pub fn file(mut self, path: impl AsRef<Path>, contents: impl Into<String>) -> Self {
        self.insert(path.as_ref(), Node::File(contents.into()));
        self
    }

    /// A directory whose listing fails with `PermissionDenied`.
    pub fn unreadable(mut self, path: impl AsRef<Path>) -> Self {
        self.insert(path.as_ref(), Node::Unreadable);
        self
    }

    /// A symbolic link at `path` pointing to `target`.
    pub fn link(mut self, path: impl AsRef<Path>, target: impl AsRef<Path>) -> Self {
        self.insert(path.as_ref(), Node::Link(target.as_ref().to_path_buf()));
        self
    }

    fn insert(&mut self, path: &Path, node: Node) {
        for ancestor in path.ancestors().skip(1) {
            self.nodes
                .entry(ancestor.to_path_buf())
                .or_insert(Node::Dir);
        }
        self.nodes.insert(path.to_path_buf(), node);
    }

    /// Follow links component by component.
    fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        let mut resolved = PathBuf::new();
        let mut hops = 0;
        for component in path.components() {
            match component {
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::CurDir => {}
                other => resolved.push(other),
            }
            while let Some(Node::Link(target)) = self.nodes.get(&resolved) {
                hops += 1;
                if hops > 40 {
                    return Err(io::Error::other("too many levels of symbolic links"));
                }
                resolved = target.clone();
            }
        }
        Ok(resolved)
    }

    fn node(&self, path: &Path) -> io::Result<(PathBuf, &Node)> {
        let resolved = self.resolve(path)?;
        match self.nodes.get(&resolved) {
            Some(node) => Ok((resolved, node)),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )),
        }
    }
}

#[cfg(test)]
impl StorageRoot for MemoryFs {
    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let (resolved, node) = self.node(path)?;
        match node {
            Node::Dir => Ok(self
                .nodes
                .keys()
                .filter(|p| p.parent() == Some(resolved.as_path()))
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect()),
            Node::Unreadable => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is not readable", path.display()),
            )),
            Node::File(_) | Node::Link(_) => Err(io::Error::other(format!(
                "{} is not a directory",
                path.display()
            ))),
        }
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        match self.node(path)? {
            (_, Node::File(contents)) => Ok(contents.clone()),
            _ => Err(io::Error::other(format!("{} is not a file", path.display()))),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.node(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.node(path), Ok((_, Node::Dir | Node::Unreadable)))
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        self.node(path).map(|(resolved, _)| resolved)
    }
}
