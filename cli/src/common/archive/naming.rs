//! # Targzip Entry Naming (`common::archive::naming`)
//!
//! File: cli/src/common/archive/naming.rs
//!
//! ## Overview
//!
//! Everything that turns paths into entry names and entry names back into paths.
//!
//! **Writing.** Each root gets a name prefix: the absolute path of the root's parent
//! directory with `\` normalized to `/`. An entry name is the visited path, normalized
//! the same way, with that prefix and the following separator stripped. The root's own
//! basename therefore becomes the top-level component of every entry it produces
//! (`/a/b/project/src/main.rs` under root `/a/b/project` is stored as
//! `project/src/main.rs`). Directory names carry a trailing `/`.
//!
//! **Reading.** Entry names are joined under the destination directory after the
//! configured `PathPolicy` has dealt with components that would escape it.
//!
//! **Suffixes.** `.tar` is the uncompressed container, `.tar.gz` the compressed one
//! (creation writes a scratch `.tar` next to it), and a standalone `.gz` decodes to
//! its name minus the suffix.
//!
use super::PathPolicy;
use crate::common::fs::walk::FileCollection;
use crate::core::error::{Result, TargzipError};
use std::path::{Component, Path, PathBuf};

pub const TAR_SUFFIX: &str = ".tar";
pub const TAR_GZ_SUFFIX: &str = ".tar.gz";
pub const GZ_SUFFIX: &str = ".gz";

/// Renders a path as a string with forward slashes only.
pub fn normalize_separators(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// The prefix stripped from every path under `collection`.
///
/// Empty when the root is a filesystem root and has no parent.
pub fn name_prefix(collection: &FileCollection) -> String {
    collection
        .parent()
        .map(normalize_separators)
        .unwrap_or_default()
}

/// Derives the stored entry name for `path` under `prefix`.
///
/// Returns `None` when nothing remains after stripping (the filesystem root itself).
pub fn entry_name(prefix: &str, path: &Path, is_dir: bool) -> Option<String> {
    let full = normalize_separators(path);
    let relative = full.strip_prefix(prefix).unwrap_or(&full);
    let relative = relative.trim_start_matches('/');
    if relative.is_empty() {
        return None;
    }
    let mut name = relative.to_string();
    if is_dir && !name.ends_with('/') {
        name.push('/');
    }
    Some(name)
}

/// Scratch `.tar` path used while building `targz_path`.
pub fn scratch_tar_path(targz_path: &Path) -> Result<PathBuf> {
    let stem = strip_file_suffix(targz_path, TAR_GZ_SUFFIX)?;
    Ok(targz_path.with_file_name(format!("{stem}{TAR_SUFFIX}")))
}

/// File name a `.gz` file decodes to: its own file name without the suffix.
pub fn gunzipped_file_name(gz_path: &Path) -> Result<String> {
    strip_file_suffix(gz_path, GZ_SUFFIX)
}

fn strip_file_suffix(path: &Path, suffix: &'static str) -> Result<String> {
    let unrecognized = || TargzipError::UnrecognizedSuffix {
        path: path.to_path_buf(),
        expected: suffix,
    };
    let file_name = path.file_name().ok_or_else(unrecognized)?.to_string_lossy();
    match file_name.strip_suffix(suffix) {
        Some(stem) if !stem.is_empty() => Ok(stem.to_string()),
        _ => Err(unrecognized().into()),
    }
}

/// Destination for entry `name` under `dest`, preserving its directory structure.
///
/// Returns `Ok(None)` when `PathPolicy::Normalize` leaves nothing to extract.
pub fn destination_path(dest: &Path, name: &str, policy: PathPolicy) -> Result<Option<PathBuf>> {
    let mut relative = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                if policy == PathPolicy::Reject {
                    return Err(TargzipError::UnsafeEntryPath {
                        name: name.to_string(),
                    }
                    .into());
                }
            }
        }
    }
    if relative.as_os_str().is_empty() {
        return Ok(None);
    }
    Ok(Some(dest.join(relative)))
}

/// Destination for entry `name` flattened to its last path segment under `dest`.
///
/// Returns `Ok(None)` when `PathPolicy::Normalize` finds no usable final segment.
pub fn flat_destination_path(dest: &Path, name: &str, policy: PathPolicy) -> Result<Option<PathBuf>> {
    let last = name.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    let mut components = Path::new(last).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) => Ok(Some(dest.join(part))),
        _ if policy == PathPolicy::Reject => Err(TargzipError::UnsafeEntryPath {
            name: name.to_string(),
        }
        .into()),
        _ => Ok(None),
    }
}
