//! # Targzip Tree Walker (`common::fs::walk`)
//!
//! File: cli/src/common/fs/walk.rs
//!

//! ## Overview
//!
//! A `FileCollection` is one root to archive: a single file or a whole directory
//! tree, held by its absolute path with `.` and `..` components resolved, so the
//! root's basename is always a real name. `scan` enumerates the root and everything
//! below it in depth-first pre-order (a directory is visited before its contents),
//! with siblings sorted by file name so archives built from the same tree are identical.
//!
//! ## Architecture
//!
//! Enumeration is delegated to `walkdir`. An optional path predicate prunes the walk:
//! it is consulted for every path below the root, and a directory that fails it is
//! skipped together with its whole subtree. Symbolic links are not followed; they and
//! other special files are reported with `VisitKind::Other` so callers can skip them.
//!
//! Any error raised while walking (unreadable directory, vanished file) aborts the scan.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let collection = FileCollection::of("/data/project")?;
//! let skip_git = |p: &Path| p.file_name() != Some(OsStr::new(".git"));
//! collection.scan(Some(&skip_git), |visited| {
//!     println!("{} (dir: {})", visited.path.display(), visited.is_dir());
//!     Ok(())
//! })?;
//! ```
//!
use crate::core::error::{Result, TargzipError};
use std::fs::Metadata;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Predicate over filesystem paths; `true` keeps the path.
pub type PathFilter<'a> = &'a (dyn Fn(&Path) -> bool + 'a);

/// What kind of filesystem object a visited path is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitKind {
    Directory,
    File,
    /// Symlinks, sockets, devices and the like.
    Other,
}

/// A path produced by `FileCollection::scan`.
#[derive(Debug)]
pub struct Visited {
    pub path: PathBuf,
    pub kind: VisitKind,
    pub metadata: Metadata,
}

impl Visited {
    pub fn is_dir(&self) -> bool {
        self.kind == VisitKind::Directory
    }
}

/// One root of files to archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCollection {
    root: PathBuf,
}

impl FileCollection {
    /// Creates a collection for `path`, resolved with `resolve_path`.
    ///
    /// The path is not required to exist yet; a missing root surfaces as an I/O error
    /// when it is scanned.
    pub fn of(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            root: resolve_path(path.as_ref())?,
        })
    }

    /// The absolute root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The absolute parent directory of the root, or `None` for a filesystem root.
    pub fn parent(&self) -> Option<&Path> {
        self.root.parent()
    }

    /// Visits the root and every path below it that passes `filter`.
    pub fn scan<F>(&self, filter: Option<PathFilter<'_>>, mut visit: F) -> Result<()>
    where
        F: FnMut(Visited) -> Result<()>,
    {
        debug!("Scanning file collection rooted at {}", self.root.display());
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || filter.map_or(true, |f| f(entry.path())));

        for entry_result in walker {
            let entry = entry_result.map_err(|e| walk_error(&self.root, e))?;
            let metadata = entry.metadata().map_err(|e| walk_error(&self.root, e))?;
            let file_type = entry.file_type();
            let kind = if file_type.is_dir() {
                VisitKind::Directory
            } else if file_type.is_file() {
                VisitKind::File
            } else {
                VisitKind::Other
            };
            visit(Visited {
                path: entry.into_path(),
                kind,
                metadata,
            })?;
        }
        Ok(())
    }
}

/// Makes `path` absolute against the current directory and drops its `.` and `..`
/// components lexically. Symbolic links are left unresolved.
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| {
        TargzipError::io(format!("resolving absolute path of {}", path.display()), e)
    })?;
    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            // `pop` is a no-op at the filesystem root, like `/..` itself.
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    Ok(resolved)
}

fn walk_error(root: &Path, err: walkdir::Error) -> TargzipError {
    let context = match err.path() {
        Some(path) => format!("walking {}", path.display()),
        None => format!("walking {}", root.display()),
    };
    match err.into_io_error() {
        Some(source) => TargzipError::io(context, source),
        None => TargzipError::io(
            context,
            io::Error::new(io::ErrorKind::Other, "filesystem loop detected"),
        ),
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn collect(collection: &FileCollection, filter: Option<PathFilter<'_>>) -> Vec<(PathBuf, VisitKind)> {
        let mut seen = Vec::new();
        collection
            .scan(filter, |v| {
                let rel = v.path.strip_prefix(collection.parent().unwrap()).unwrap().to_path_buf();
                seen.push((rel, v.kind));
                Ok(())
            })
            .unwrap();
        seen
    }

    #[test]
    fn test_scan_preorder_sorted() -> Result<()> {
        let temp_dir = tempdir()?;
        let root = temp_dir.path().join("root");
        fs::create_dir_all(root.join("sub"))?;
        fs::write(root.join("b.txt"), "b")?;
        fs::write(root.join("a.txt"), "a")?;
        fs::write(root.join("sub/c.txt"), "c")?;

        let seen = collect(&FileCollection::of(&root)?, None);
        assert_eq!(
            seen,
            vec![
                (PathBuf::from("root"), VisitKind::Directory),
                (PathBuf::from("root/a.txt"), VisitKind::File),
                (PathBuf::from("root/b.txt"), VisitKind::File),
                (PathBuf::from("root/sub"), VisitKind::Directory),
                (PathBuf::from("root/sub/c.txt"), VisitKind::File),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_filter_prunes_subtree_but_not_root() -> Result<()> {
        let temp_dir = tempdir()?;
        let root = temp_dir.path().join("skipme");
        fs::create_dir_all(root.join("skipme"))?;
        fs::write(root.join("skipme/inner.txt"), "x")?;
        fs::write(root.join("keep.txt"), "k")?;

        let filter = |p: &Path| p.file_name().map_or(true, |n| n != "skipme");
        let seen = collect(&FileCollection::of(&root)?, Some(&filter));
        assert_eq!(
            seen,
            vec![
                (PathBuf::from("skipme"), VisitKind::Directory),
                (PathBuf::from("skipme/keep.txt"), VisitKind::File),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_single_file_root() -> Result<()> {
        let temp_dir = tempdir()?;
        let file = temp_dir.path().join("lonely.txt");
        fs::write(&file, "solo")?;
        let seen = collect(&FileCollection::of(&file)?, None);
        assert_eq!(seen, vec![(PathBuf::from("lonely.txt"), VisitKind::File)]);
        Ok(())
    }

    #[test]
    fn test_missing_root_is_io_error() -> Result<()> {
        let temp_dir = tempdir()?;
        let collection = FileCollection::of(temp_dir.path().join("nope"))?;
        let err = collection.scan(None, |_| Ok(())).unwrap_err();
        assert!(err.downcast_ref::<TargzipError>().is_some_and(TargzipError::is_io));
        Ok(())
    }

    #[test]
    fn test_relative_root_made_absolute() -> Result<()> {
        let collection = FileCollection::of("some/relative/dir")?;
        assert!(collection.root().is_absolute());
        assert!(collection.root().ends_with("some/relative/dir"));
        Ok(())
    }

    #[test]
    fn test_dot_dot_root_resolves_to_parent() -> Result<()> {
        let temp_dir = tempdir()?;
        let dir = temp_dir.path().join("dir");
        fs::create_dir_all(dir.join("sub"))?;
        fs::write(dir.join("top.txt"), "t")?;

        let collection = FileCollection::of(dir.join("sub/.."))?;
        assert_eq!(collection.root(), dir.as_path());
        assert_eq!(collection.parent(), Some(temp_dir.path()));

        let seen = collect(&collection, None);
        assert_eq!(seen[0], (PathBuf::from("dir"), VisitKind::Directory));
        assert!(seen.iter().all(|(p, _)| p.starts_with("dir")), "{seen:?}");
        Ok(())
    }

    #[test]
    fn test_resolve_path_components() -> Result<()> {
        assert_eq!(resolve_path(Path::new("/a/./b/../c"))?, PathBuf::from("/a/c"));
        assert_eq!(resolve_path(Path::new("/../x"))?, PathBuf::from("/x"));
        assert!(!resolve_path(Path::new(".."))?
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::CurDir)));
        Ok(())
    }
}
