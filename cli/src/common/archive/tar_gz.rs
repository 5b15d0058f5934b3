//! # Targzip Compressed Archive Operations (`common::archive::tar_gz`)
//!
//! File: cli/src/common/archive/tar_gz.rs
//!
//! ## Overview
//!
//! `.tar.gz` support layered over the plain tar module and the gzip bridge.
//!
//! - **Creation** goes through a scratch container: `out.tar.gz` is built as `out.tar`
//!   next to it, the scratch file is gzip-encoded into the destination, and the scratch
//!   file is removed once encoding succeeded. A failure leaves both files as they are.
//! - **Full extraction** (`decompress`) decodes to a uniquely named temporary `.tar`
//!   in the destination directory, extracts from it, and removes it afterwards. Files
//!   already in the destination and entries of the archive never share its name.
//! - **Listing and filtered extraction** never touch the disk for the decoded bytes: a
//!   background worker inflates the archive into a pipe that the tar reader consumes
//!   (see `pipe`). Whether decoding overlaps with reading is the `Handoff` setting.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::common::archive::{tar_gz, ArchiveSettings, ChildrenOf, TarGzipProcessor};
//!
//! let settings = ArchiveSettings::default();
//! TarGzipProcessor::new(ChildrenOf::new("/srv/www"), settings.clone()).compress("www.tar.gz")?;
//!
//! let configs = tar_gz::entries_matching("www.tar.gz", |e| e.name.ends_with(".conf"), &settings)?;
//! tar_gz::predicate_open("www.tar.gz", "/tmp/confs", |e| e.name.ends_with(".conf"), &settings)?;
//! ```
//!
use super::source::RootSource;
use super::{compression, naming, pipe, reader, tar, ArchiveEntry, ArchiveSettings};
use crate::common::fs::io as fsio;
use crate::common::fs::walk::PathFilter;
use crate::core::error::{Result, TargzipError};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Builds gzip-compressed `.tar.gz` archives from the roots of a `RootSource`.
#[derive(Debug, Clone)]
pub struct TarGzipProcessor<S> {
    source: S,
    settings: ArchiveSettings,
}

impl<S: RootSource> TarGzipProcessor<S> {
    pub fn new(source: S, settings: ArchiveSettings) -> Self {
        Self { source, settings }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn settings(&self) -> &ArchiveSettings {
        &self.settings
    }

    /// Writes every root into `targz_path`. Returns the entry names in write order.
    ///
    /// `targz_path` must end with `.tar.gz`.
    pub fn compress(&self, targz_path: impl AsRef<Path>) -> Result<Vec<String>> {
        self.build(targz_path.as_ref(), None)
    }

    /// Like `compress`, but only paths accepted by `filter` are archived.
    pub fn compress_filtered<P>(&self, targz_path: impl AsRef<Path>, filter: P) -> Result<Vec<String>>
    where
        P: Fn(&Path) -> bool,
    {
        self.build(targz_path.as_ref(), Some(&filter))
    }

    fn build(&self, targz_path: &Path, filter: Option<PathFilter<'_>>) -> Result<Vec<String>> {
        let scratch = naming::scratch_tar_path(targz_path)?;
        let names = tar::create_tar(&scratch, &self.source, filter, &[targz_path], &self.settings)?;
        let size = compression::gzip_file(&scratch, targz_path, &self.settings)?;
        fsio::remove_file_best_effort(&scratch);
        info!(
            "Compressed {} entries ({} bytes of tar) into {}",
            names.len(),
            size,
            targz_path.display()
        );
        Ok(names)
    }
}

/// Extracts the whole `.tar.gz` at `targz_path` under `dir`. Returns the entry names
/// materialized.
///
/// The archive is first decoded to a temporary `.tar` inside `dir`, which is removed
/// whether or not extraction succeeds.
pub fn decompress(
    targz_path: impl AsRef<Path>,
    dir: impl AsRef<Path>,
    settings: &ArchiveSettings,
) -> Result<Vec<String>> {
    let (targz_path, dir) = (targz_path.as_ref(), dir.as_ref());
    let name = naming::gunzipped_file_name(targz_path)?;
    fsio::ensure_dir_exists(dir)?;

    let mut intermediate = tempfile::Builder::new()
        .prefix(".targzip-")
        .suffix(".tar")
        .tempfile_in(dir)
        .map_err(|e| TargzipError::io(format!("creating intermediate tar in {}", dir.display()), e))?;
    let intermediate_path = intermediate.path().to_path_buf();
    let decoded = compression::gunzip_into(
        targz_path,
        intermediate.as_file_mut(),
        &intermediate_path,
        settings,
    )?;
    debug!(
        "Decoded {} ({} bytes) into {}",
        name,
        decoded,
        intermediate_path.display()
    );

    let names = tar::decompress(&intermediate_path, dir, settings)?;
    if let Err(e) = intermediate.close() {
        warn!(
            "Failed to remove intermediate tar {}: {}",
            intermediate_path.display(),
            e
        );
    }
    Ok(names)
}

/// Entry names of the `.tar.gz` at `targz_path`, in archive order.
pub fn view_path(targz_path: impl AsRef<Path>, settings: &ArchiveSettings) -> Result<Vec<String>> {
    pipe::with_decoded(targz_path.as_ref(), settings, |decoded| reader::list_names(decoded))
}

/// Every entry of the `.tar.gz` at `targz_path`, in archive order.
pub fn entries(targz_path: impl AsRef<Path>, settings: &ArchiveSettings) -> Result<Vec<ArchiveEntry>> {
    entries_matching(targz_path, |_| true, settings)
}

/// Entries of the `.tar.gz` at `targz_path` accepted by `predicate`, in archive order.
pub fn entries_matching<P>(
    targz_path: impl AsRef<Path>,
    predicate: P,
    settings: &ArchiveSettings,
) -> Result<Vec<ArchiveEntry>>
where
    P: Fn(&ArchiveEntry) -> bool,
{
    pipe::with_decoded(targz_path.as_ref(), settings, |decoded| {
        reader::collect_entries(decoded, predicate)
    })
}

/// Writes the file entries accepted by `predicate` into `dir`, flattened to their last
/// path segment. Returns the paths written.
pub fn predicate_open<P>(
    targz_path: impl AsRef<Path>,
    dir: impl AsRef<Path>,
    predicate: P,
    settings: &ArchiveSettings,
) -> Result<Vec<PathBuf>>
where
    P: Fn(&ArchiveEntry) -> bool,
{
    let dir = dir.as_ref();
    pipe::with_decoded(targz_path.as_ref(), settings, |decoded| {
        reader::extract_flat(decoded, dir, predicate, settings)
    })
}
