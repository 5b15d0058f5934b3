//! # Targzip TAR Archive Operations (`common::archive::tar`)
//!
//! File: cli/src/common/archive/tar.rs
//!
//! ## Overview
//!
//! This module builds and reads uncompressed `.tar` archives. It is also the first half
//! of compressed creation: `TarGzipProcessor` writes its scratch container through
//! `create_tar` before gzip-encoding it.
//!
//! ## Architecture
//!
//! The module leverages the `tar` crate for record framing and `walkdir` (through
//! `FileCollection::scan`) for enumeration.
//!
//! - Every root gets its own name prefix (its parent directory), so each root's basename
//!   becomes the top-level component of its entries. Roots are written in the order the
//!   `RootSource` returns them; paths inside a root in sorted pre-order.
//! - Headers are GNU headers. Names longer than the 100-byte header field are written
//!   with a GNU long-name record, so deep trees never truncate.
//! - Directory entries are zero-length with a trailing `/` in the name. File bodies are
//!   streamed from disk through a buffer of `copy_buffer_size` bytes.
//! - Symbolic links and special files are skipped with a warning.
//! - The archive being written is never enumerated into itself when it lies inside a
//!   root. Callers can name further paths to leave out (the final `.tar.gz` next to a
//!   scratch container).
//!
//! A failure aborts the operation. The partially written archive is left on disk.
//!
//! Reading operations are free functions since they need no roots: `decompress`,
//! `view_path`, `entries`, `entries_matching`, `predicate_open`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::common::archive::{tar, ArchiveSettings, Roots, TarProcessor};
//!
//! let settings = ArchiveSettings::default();
//! let processor = TarProcessor::new(Roots::from_paths(["/srv/site"])?, settings.clone());
//! let names = processor.compress("/backups/site.tar")?; // ["site/", "site/index.html", ...]
//!
//! let restored = tar::decompress("/backups/site.tar", "/restore", &settings)?;
//! assert_eq!(names, restored);
//! ```
//!
use super::source::RootSource;
use super::{naming, reader, ArchiveEntry, ArchiveSettings};
use crate::common::fs::io as fsio;
use crate::common::fs::walk::{self, FileCollection, PathFilter, VisitKind};
use crate::core::error::{Result, TargzipError};
use std::fs::{File, Metadata};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Builds plain `.tar` archives from the roots of a `RootSource`.
#[derive(Debug, Clone)]
pub struct TarProcessor<S> {
    source: S,
    settings: ArchiveSettings,
}

impl<S: RootSource> TarProcessor<S> {
    pub fn new(source: S, settings: ArchiveSettings) -> Self {
        Self { source, settings }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn settings(&self) -> &ArchiveSettings {
        &self.settings
    }

    /// Writes every root into a tar at `tar_path`. Returns the entry names in write order.
    pub fn compress(&self, tar_path: impl AsRef<Path>) -> Result<Vec<String>> {
        create_tar(tar_path.as_ref(), &self.source, None, &[], &self.settings)
    }

    /// Like `compress`, but only paths accepted by `filter` are archived.
    ///
    /// The filter never sees a root itself. A rejected directory is pruned with its subtree.
    pub fn compress_filtered<P>(&self, tar_path: impl AsRef<Path>, filter: P) -> Result<Vec<String>>
    where
        P: Fn(&Path) -> bool,
    {
        create_tar(tar_path.as_ref(), &self.source, Some(&filter), &[], &self.settings)
    }
}

/// Creates (or truncates) `tar_path` and writes every root of `source` into it.
///
/// `tar_path` itself and every path in `also_skip` are left out of the archive.
pub fn create_tar<S>(
    tar_path: &Path,
    source: &S,
    filter: Option<PathFilter<'_>>,
    also_skip: &[&Path],
    settings: &ArchiveSettings,
) -> Result<Vec<String>>
where
    S: RootSource + ?Sized,
{
    let roots = source.roots()?;
    info!("Creating tar archive {} from {} root(s)", tar_path.display(), roots.len());

    let skip = std::iter::once(tar_path)
        .chain(also_skip.iter().copied())
        .map(walk::resolve_path)
        .collect::<Result<Vec<_>>>()?;

    let file = fsio::create_file_with_parents(tar_path)?;
    let writer = BufWriter::with_capacity(settings.copy_buffer_size.max(1), file);
    let mut builder = ::tar::Builder::new(writer);
    let names = append_collections(&mut builder, &roots, filter, &skip, settings)?;

    let context = || format!("finishing {}", tar_path.display());
    let writer = builder
        .into_inner()
        .map_err(|e| TargzipError::io(context(), e))?;
    let file: File = writer
        .into_inner()
        .map_err(|e| TargzipError::io(context(), e.into_error()))?;
    file.sync_all().map_err(|e| TargzipError::io(context(), e))?;

    info!("Wrote {} entries to {}", names.len(), tar_path.display());
    Ok(names)
}

/// Appends the entries of every collection, in order, to `builder`.
///
/// Visited paths equal to one of `skip` (absolute, as made by `walk::resolve_path`)
/// are not archived.
pub fn append_collections<W: Write>(
    builder: &mut ::tar::Builder<W>,
    roots: &[FileCollection],
    filter: Option<PathFilter<'_>>,
    skip: &[PathBuf],
    settings: &ArchiveSettings,
) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for collection in roots {
        let prefix = naming::name_prefix(collection);
        debug!("Archiving {} with name prefix '{}'", collection.root().display(), prefix);

        collection.scan(filter, |visited| {
            if skip.contains(&visited.path) {
                debug!("Skipping {}: archive output", visited.path.display());
                return Ok(());
            }
            let Some(name) = naming::entry_name(&prefix, &visited.path, visited.is_dir()) else {
                return Ok(());
            };
            match visited.kind {
                VisitKind::Directory => append_directory(builder, &name, &visited.metadata)?,
                VisitKind::File => append_file(builder, &name, &visited.path, settings)?,
                VisitKind::Other => {
                    warn!("Skipping {}: not a regular file or directory", visited.path.display());
                    return Ok(());
                }
            }
            debug!("Added entry '{}'", name);
            names.push(name);
            Ok(())
        })?;
    }
    Ok(names)
}

fn append_directory<W: Write>(builder: &mut ::tar::Builder<W>, name: &str, metadata: &Metadata) -> Result<()> {
    let mut header = ::tar::Header::new_gnu();
    header.set_metadata(metadata);
    header.set_entry_type(::tar::EntryType::Directory);
    header.set_size(0);
    builder
        .append_data(&mut header, name, io::empty())
        .map_err(|e| TargzipError::io(format!("adding directory entry '{name}'"), e).into())
}

fn append_file<W: Write>(
    builder: &mut ::tar::Builder<W>,
    name: &str,
    path: &Path,
    settings: &ArchiveSettings,
) -> Result<()> {
    let file = fsio::open_file(path)?;
    let metadata = file
        .metadata()
        .map_err(|e| TargzipError::io(format!("reading metadata of {}", path.display()), e))?;
    let mut header = ::tar::Header::new_gnu();
    header.set_metadata(&metadata);
    header.set_entry_type(::tar::EntryType::Regular);
    header.set_size(metadata.len());

    // Never write more than the header promises, even if the file grew meanwhile.
    let body = BufReader::with_capacity(settings.copy_buffer_size.max(1), file).take(metadata.len());
    builder
        .append_data(&mut header, name, body)
        .map_err(|e| TargzipError::io(format!("adding {} as '{name}'", path.display()), e).into())
}

fn open_archive(tar_path: &Path, settings: &ArchiveSettings) -> Result<BufReader<File>> {
    let file = fsio::open_file(tar_path)?;
    Ok(BufReader::with_capacity(settings.copy_buffer_size.max(1), file))
}

/// Extracts the whole tar at `tar_path` under `dir`. Returns the entry names materialized.
pub fn decompress(
    tar_path: impl AsRef<Path>,
    dir: impl AsRef<Path>,
    settings: &ArchiveSettings,
) -> Result<Vec<String>> {
    let source = open_archive(tar_path.as_ref(), settings)?;
    reader::extract_all(source, dir.as_ref(), settings)
}

/// Entry names of the tar at `tar_path`, in archive order.
pub fn view_path(tar_path: impl AsRef<Path>, settings: &ArchiveSettings) -> Result<Vec<String>> {
    reader::list_names(open_archive(tar_path.as_ref(), settings)?)
}

/// Every entry of the tar at `tar_path`, in archive order.
pub fn entries(tar_path: impl AsRef<Path>, settings: &ArchiveSettings) -> Result<Vec<ArchiveEntry>> {
    entries_matching(tar_path, |_| true, settings)
}

/// Entries of the tar at `tar_path` accepted by `predicate`, in archive order.
pub fn entries_matching<P>(
    tar_path: impl AsRef<Path>,
    predicate: P,
    settings: &ArchiveSettings,
) -> Result<Vec<ArchiveEntry>>
where
    P: Fn(&ArchiveEntry) -> bool,
{
    reader::collect_entries(open_archive(tar_path.as_ref(), settings)?, predicate)
}

/// Writes the file entries accepted by `predicate` into `dir`, flattened to their last
/// path segment. Returns the paths written.
pub fn predicate_open<P>(
    tar_path: impl AsRef<Path>,
    dir: impl AsRef<Path>,
    predicate: P,
    settings: &ArchiveSettings,
) -> Result<Vec<PathBuf>>
where
    P: Fn(&ArchiveEntry) -> bool,
{
    let source = open_archive(tar_path.as_ref(), settings)?;
    reader::extract_flat(source, dir.as_ref(), predicate, settings)
}
