//! # Targzip Root Sources (`common::archive::source`)
//!
//! File: cli/src/common/archive/source.rs
//!
//! ## Overview
//!
//! A `RootSource` answers one question for the archive builders: which roots go into
//! this archive, in which order. The processors own their source and ask it for roots
//! each time they build.
//!
//! ## Provided Sources
//!
//! - **`Roots`**: An explicit ordered list, e.g. one directory tree or several unrelated trees.
//! - **`ChildrenOf`**: Every direct child of a directory as its own root, sorted by name, so
//!   the archive holds `a/...`, `b/...` instead of `parent/a/...`.
//! - **`FnSource`**: Wraps any `Fn() -> Result<Vec<FileCollection>>` for computed selections.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let single = Roots::from_paths(["/data/project"])?;
//! let spread = ChildrenOf::new("/data");
//! let custom = FnSource::new(|| Ok(vec![FileCollection::of("/etc/app.conf")?]));
//! ```
//!
use crate::common::fs::walk::FileCollection;
use crate::core::error::{Result, TargzipError};
use std::fs;
use std::path::{Path, PathBuf};

/// Provider of the ordered roots to archive.
pub trait RootSource {
    fn roots(&self) -> Result<Vec<FileCollection>>;
}

impl<S: RootSource + ?Sized> RootSource for &S {
    fn roots(&self) -> Result<Vec<FileCollection>> {
        (**self).roots()
    }
}

/// An explicit, ordered list of roots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roots(Vec<FileCollection>);

impl Roots {
    pub fn new(roots: Vec<FileCollection>) -> Self {
        Self(roots)
    }

    pub fn from_paths<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths
            .into_iter()
            .map(FileCollection::of)
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl RootSource for Roots {
    fn roots(&self) -> Result<Vec<FileCollection>> {
        Ok(self.0.clone())
    }
}

/// Every direct child of a directory, each as its own root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildrenOf(PathBuf);

impl ChildrenOf {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self(dir.into())
    }
}

impl RootSource for ChildrenOf {
    fn roots(&self) -> Result<Vec<FileCollection>> {
        let read_dir = fs::read_dir(&self.0).map_err(|e| {
            TargzipError::io(format!("listing children of {}", self.0.display()), e)
        })?;
        let mut children = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| {
                TargzipError::io(format!("listing children of {}", self.0.display()), e)
            })?;
            children.push(entry.path());
        }
        children.sort();
        children.into_iter().map(FileCollection::of).collect()
    }
}

/// Roots computed by a closure each time they are requested.
pub struct FnSource<F>(F);

impl<F> FnSource<F>
where
    F: Fn() -> Result<Vec<FileCollection>>,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> RootSource for FnSource<F>
where
    F: Fn() -> Result<Vec<FileCollection>>,
{
    fn roots(&self) -> Result<Vec<FileCollection>> {
        (self.0)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_roots_preserve_order() -> Result<()> {
        let roots = Roots::from_paths(["/z/last", "/a/first"])?;
        let listed = roots.roots()?;
        assert_eq!(listed[0].root(), Path::new("/z/last"));
        assert_eq!(listed[1].root(), Path::new("/a/first"));
        Ok(())
    }

    #[test]
    fn test_children_of_sorted() -> Result<()> {
        let temp_dir = tempdir()?;
        fs::create_dir(temp_dir.path().join("beta"))?;
        fs::write(temp_dir.path().join("alpha.txt"), "a")?;
        fs::create_dir(temp_dir.path().join("gamma"))?;

        let roots = ChildrenOf::new(temp_dir.path()).roots()?;
        let names: Vec<_> = roots
            .iter()
            .map(|c| c.root().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["alpha.txt", "beta", "gamma"]);
        Ok(())
    }

    #[test]
    fn test_children_of_missing_dir() {
        assert!(ChildrenOf::new("/definitely/not/here").roots().is_err());
    }

    #[test]
    fn test_fn_source() -> Result<()> {
        let source = FnSource::new(|| Ok(vec![FileCollection::of("/opt/app")?]));
        assert_eq!(source.roots()?.len(), 1);
        Ok(())
    }
}
