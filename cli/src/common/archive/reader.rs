//! # Targzip Entry Reader (`common::archive::reader`)
//!
//! File: cli/src/common/archive/reader.rs
//!
//! ## Overview
//!
//! The sequential reading side of the engine. Every listing, filtering and extraction
//! operation is one pass over a tar stream: pull the next header, hand the entry to a
//! visitor, repeat until the reader reports end-of-archive. The stream may be a plain
//! file or the read end of the decode pipe; this module does not care which.
//!
//! ## Architecture
//!
//! - **`for_each_entry`**: The single loop everything else is built on. Header and body
//!   read failures are reported as `TargzipError::MalformedArchive` (or `Io` for OS-level
//!   failures) and abort the pass.
//! - **`list_names`** / **`collect_entries`**: Listing, optionally filtered by an entry predicate.
//! - **`extract_all`**: Materializes every entry under a destination, recreating directories.
//! - **`extract_flat`**: Writes matching file entries directly into the destination under
//!   their last path segment, without recreating the archive's directory structure.
//!
//! Extraction never cleans up after a failure: files written before the error stay on disk.
//!
use super::{naming, ArchiveEntry, ArchiveSettings};
use crate::common::fs::io::{self as fsio, CopyError};
use crate::core::error::{Result, TargzipError};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What an entry is, as far as extraction is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Directory,
    File,
    Other,
}

/// Visits every entry of the tar stream `source` in order.
///
/// The visitor receives the entry description and a reader positioned at the entry body.
/// It may read the body partially or not at all; the remainder is skipped.
pub fn for_each_entry<R, F>(source: R, mut visit: F) -> Result<()>
where
    R: Read,
    F: FnMut(&ArchiveEntry, &mut dyn Read) -> Result<()>,
{
    for_each_entry_with_kind(source, |entry, _, body| visit(entry, body))
}

fn for_each_entry_with_kind<R, F>(source: R, mut visit: F) -> Result<()>
where
    R: Read,
    F: FnMut(&ArchiveEntry, EntryKind, &mut dyn Read) -> Result<()>,
{
    let mut archive = ::tar::Archive::new(source);
    let entries = archive
        .entries()
        .map_err(|e| TargzipError::from_archive_read("opening tar stream", e))?;

    for entry_result in entries {
        let mut entry = entry_result
            .map_err(|e| TargzipError::from_archive_read("reading tar entry header", e))?;
        let (described, kind) = describe(&entry);
        debug!("Read entry '{}' ({:?}, {} bytes)", described.name, kind, described.size);
        visit(&described, kind, &mut entry)?;
    }
    Ok(())
}

fn describe<R: Read>(entry: &::tar::Entry<'_, R>) -> (ArchiveEntry, EntryKind) {
    let header = entry.header();
    let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
    let entry_type = header.entry_type();
    let kind = if entry_type.is_dir() || name.ends_with('/') {
        EntryKind::Directory
    } else if matches!(
        entry_type,
        ::tar::EntryType::Regular | ::tar::EntryType::Continuous
    ) {
        EntryKind::File
    } else {
        EntryKind::Other
    };
    let described = ArchiveEntry {
        name,
        is_dir: kind == EntryKind::Directory,
        size: entry.size(),
        mode: header.mode().ok(),
        modified: header.mtime().ok(),
    };
    (described, kind)
}

/// Entry names in archive order.
pub fn list_names<R: Read>(source: R) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for_each_entry(source, |entry, _| {
        names.push(entry.name.clone());
        Ok(())
    })?;
    Ok(names)
}

/// Entries accepted by `predicate`, in archive order.
pub fn collect_entries<R, P>(source: R, predicate: P) -> Result<Vec<ArchiveEntry>>
where
    R: Read,
    P: Fn(&ArchiveEntry) -> bool,
{
    let mut entries = Vec::new();
    for_each_entry(source, |entry, _| {
        if predicate(entry) {
            entries.push(entry.clone());
        }
        Ok(())
    })?;
    Ok(entries)
}

/// Extracts every entry under `dest`, returning the names materialized in order.
///
/// Directory entries become directories (with missing ancestors); file entries are
/// streamed verbatim into newly created files. Other entry types are skipped.
pub fn extract_all<R: Read>(source: R, dest: &Path, settings: &ArchiveSettings) -> Result<Vec<String>> {
    info!("Extracting archive into {}", dest.display());
    fsio::ensure_dir_exists(dest)?;
    let mut names = Vec::new();
    for_each_entry_with_kind(source, |entry, kind, body| {
        if kind == EntryKind::Other {
            warn!("Skipping entry '{}': not a regular file or directory", entry.name);
            return Ok(());
        }
        let Some(target) = naming::destination_path(dest, &entry.name, settings.path_policy)? else {
            warn!("Skipping entry '{}': nothing left after path normalization", entry.name);
            return Ok(());
        };
        if kind == EntryKind::Directory {
            fsio::ensure_dir_exists(&target)?;
        } else {
            write_body(entry, body, &target, settings)?;
        }
        names.push(entry.name.clone());
        Ok(())
    })?;
    info!("Extracted {} entries into {}", names.len(), dest.display());
    Ok(names)
}

/// Writes file entries accepted by `predicate` into `dest` under their last path segment.
///
/// Directory entries never match. Returns the paths written, in archive order. Two
/// matching entries with the same final segment overwrite each other.
pub fn extract_flat<R, P>(
    source: R,
    dest: &Path,
    predicate: P,
    settings: &ArchiveSettings,
) -> Result<Vec<PathBuf>>
where
    R: Read,
    P: Fn(&ArchiveEntry) -> bool,
{
    info!("Extracting matching entries flat into {}", dest.display());
    fsio::ensure_dir_exists(dest)?;
    let mut written = Vec::new();
    for_each_entry_with_kind(source, |entry, kind, body| {
        if kind != EntryKind::File || !predicate(entry) {
            return Ok(());
        }
        let Some(target) = naming::flat_destination_path(dest, &entry.name, settings.path_policy)? else {
            warn!("Skipping entry '{}': no usable file name", entry.name);
            return Ok(());
        };
        write_body(entry, body, &target, settings)?;
        written.push(target);
        Ok(())
    })?;
    info!("Wrote {} matching entries into {}", written.len(), dest.display());
    Ok(written)
}

fn write_body(
    entry: &ArchiveEntry,
    body: &mut dyn Read,
    target: &Path,
    settings: &ArchiveSettings,
) -> Result<()> {
    let mut file = fsio::create_file_with_parents(target)?;
    let copied = fsio::copy_chunked(body, &mut file, settings.copy_buffer_size).map_err(|e| match e {
        CopyError::Read(source) => {
            TargzipError::from_archive_read(format!("reading body of '{}'", entry.name), source)
        }
        CopyError::Write(source) => TargzipError::io(format!("writing {}", target.display()), source),
    })?;
    debug!("Wrote {} bytes to {}", copied, target.display());
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::archive::PathPolicy;
    use std::fs;
    use tempfile::tempdir;

    /// Builds an in-memory tar with the given (name, body) pairs; names ending in `/` are directories.
    fn tar_bytes(items: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = ::tar::Builder::new(Vec::new());
        for (name, body) in items {
            let mut header = ::tar::Header::new_gnu();
            if name.ends_with('/') {
                header.set_entry_type(::tar::EntryType::Directory);
                header.set_mode(0o755);
            } else {
                header.set_entry_type(::tar::EntryType::Regular);
                header.set_mode(0o644);
            }
            header.set_size(body.len() as u64);
            builder.append_data(&mut header, name, *body).unwrap();
        }
        builder.into_inner().unwrap()
    }

    /// Writes a raw header with an arbitrary name, bypassing the `tar` crate's path checks.
    fn raw_tar_with_name(name: &str, body: &[u8]) -> Vec<u8> {
        let mut header = ::tar::Header::new_old();
        header.as_old_mut().name[..name.len()].copy_from_slice(name.as_bytes());
        header.set_entry_type(::tar::EntryType::Regular);
        header.set_mode(0o644);
        header.set_size(body.len() as u64);
        header.set_cksum();
        let mut out = header.as_bytes().to_vec();
        out.extend_from_slice(body);
        out.resize(out.len() + (512 - body.len() % 512) % 512, 0);
        out.extend_from_slice(&[0u8; 1024]);
        out
    }

    #[test]
    fn test_list_names_in_order() -> Result<()> {
        let data = tar_bytes(&[("root/", b""), ("root/a.txt", b"hello"), ("root/sub/", b"")]);
        assert_eq!(
            list_names(data.as_slice())?,
            vec!["root/", "root/a.txt", "root/sub/"]
        );
        Ok(())
    }

    #[test]
    fn test_collect_entries_filters_and_describes() -> Result<()> {
        let data = tar_bytes(&[("root/", b""), ("root/a.txt", b"hello"), ("root/b.md", b"md")]);
        let entries = collect_entries(data.as_slice(), |e| !e.is_dir)?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "root/a.txt");
        assert_eq!(entries[0].size, 5);
        assert_eq!(entries[0].mode, Some(0o644));
        assert!(!entries[0].is_dir);
        Ok(())
    }

    #[test]
    fn test_extract_all_recreates_tree() -> Result<()> {
        let temp_dir = tempdir()?;
        let data = tar_bytes(&[
            ("root/", b""),
            ("root/a.txt", b"hello"),
            ("root/empty/", b""),
            ("root/sub/b.txt", b"world"),
        ]);
        let names = extract_all(data.as_slice(), temp_dir.path(), &ArchiveSettings::default())?;
        assert_eq!(names.len(), 4);
        assert_eq!(fs::read_to_string(temp_dir.path().join("root/a.txt"))?, "hello");
        assert_eq!(fs::read_to_string(temp_dir.path().join("root/sub/b.txt"))?, "world");
        let empty = temp_dir.path().join("root/empty");
        assert!(empty.is_dir());
        assert_eq!(fs::read_dir(&empty)?.count(), 0);
        Ok(())
    }

    #[test]
    fn test_extract_flat_uses_last_segment() -> Result<()> {
        let temp_dir = tempdir()?;
        let data = tar_bytes(&[
            ("root/", b""),
            ("root/deep/er/wanted.txt", b"yes"),
            ("root/other.txt", b"no"),
        ]);
        let written = extract_flat(
            data.as_slice(),
            temp_dir.path(),
            |e| e.name.ends_with("wanted.txt") || e.is_dir,
            &ArchiveSettings::default(),
        )?;
        assert_eq!(written, vec![temp_dir.path().join("wanted.txt")]);
        assert_eq!(fs::read_to_string(temp_dir.path().join("wanted.txt"))?, "yes");
        assert!(!temp_dir.path().join("root").exists());
        assert!(!temp_dir.path().join("other.txt").exists());
        Ok(())
    }

    #[test]
    fn test_traversal_rejected_by_default() -> Result<()> {
        let temp_dir = tempdir()?;
        let dest = temp_dir.path().join("dest");
        let data = raw_tar_with_name("../escape.txt", b"pwned");
        let err = extract_all(data.as_slice(), &dest, &ArchiveSettings::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TargzipError>(),
            Some(TargzipError::UnsafeEntryPath { .. })
        ));
        assert!(!temp_dir.path().join("escape.txt").exists());
        Ok(())
    }

    #[test]
    fn test_traversal_normalized_when_configured() -> Result<()> {
        let temp_dir = tempdir()?;
        let dest = temp_dir.path().join("dest");
        let data = raw_tar_with_name("../escape.txt", b"contained");
        let settings = ArchiveSettings::default().with_path_policy(PathPolicy::Normalize);
        let names = extract_all(data.as_slice(), &dest, &settings)?;
        assert_eq!(names, vec!["../escape.txt"]);
        assert_eq!(fs::read_to_string(dest.join("escape.txt"))?, "contained");
        assert!(!temp_dir.path().join("escape.txt").exists());
        Ok(())
    }

    #[test]
    fn test_truncated_archive_is_malformed() {
        let data = tar_bytes(&[("root/a.txt", &[1u8; 2000])]);
        let truncated = &data[..1024];
        let err = list_names(truncated).unwrap_err();
        assert!(err
            .downcast_ref::<TargzipError>()
            .is_some_and(TargzipError::is_malformed));
    }
}
