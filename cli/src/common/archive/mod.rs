//! # Targzip Archive Engine (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//!
//! ## Overview
//!
//! This module is the archive engine: it bundles an arbitrary collection of file
//! trees into a `.tar` or `.tar.gz` container, preserving each tree's relative
//! structure under its own basename, and reads such containers back to list,
//! filter or extract their entries.
//!
//! ## Architecture
//!
//! - **`naming`**: Entry name derivation (per-root name prefix, separator normalization) and the `.tar` / `.tar.gz` / `.gz` suffix conventions.
//! - **`source`**: `RootSource`, the provider of the roots to archive (`Roots`, `ChildrenOf`, `FnSource`).
//! - **`tar`**: The archive builder and `TarProcessor`, the plain tar front end.
//! - **`reader`**: The sequential entry reader shared by listing, filtering and extraction.
//! - **`compression`**: The gzip bridge: encoding a finished container, decoding standalone `.gz` files.
//! - **`pipe`**: The bounded pipe and background decode worker feeding the tar reader.
//! - **`tar_gz`**: `TarGzipProcessor`, the gzip-compressed front end.
//!
//! Archives are write-once, read-sequential. Creation runs on the calling thread; reading
//! a compressed archive spins up exactly one decode worker per operation.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::common::archive::{tar_gz, ArchiveSettings, Roots, TarGzipProcessor};
//!
//! let settings = ArchiveSettings::default();
//! let processor = TarGzipProcessor::new(Roots::from_paths(["/data/project", "/etc/app"])?, settings.clone());
//! let written = processor.compress("backup.tar.gz")?;
//! let listed = tar_gz::view_path("backup.tar.gz", &settings)?;
//! assert_eq!(written, listed);
//! ```
//!
use serde::Deserialize;
use std::path::Path;

pub mod compression;
pub mod naming;
pub mod pipe;
pub mod reader;
pub mod source;
pub mod tar;
pub mod tar_gz;

pub use self::source::{ChildrenOf, FnSource, RootSource, Roots};
pub use self::tar::TarProcessor;
pub use self::tar_gz::TarGzipProcessor;

/// An entry as found in an archive once read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Slash-separated relative path; directory names end with `/`.
    pub name: String,
    pub is_dir: bool,
    /// Body size in bytes (zero for directories).
    pub size: u64,
    /// Permission bits, when the header carries a readable value.
    pub mode: Option<u32>,
    /// Modification time in seconds since the Unix epoch, when readable.
    pub modified: Option<u64>,
}

/// Container flavour, decided by file name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Tar,
    TarGz,
}

impl ArchiveKind {
    /// Maps `*.tar.gz` to `TarGz` and `*.tar` to `Tar`; anything else is `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy();
        if name.ends_with(naming::TAR_GZ_SUFFIX) {
            Some(ArchiveKind::TarGz)
        } else if name.ends_with(naming::TAR_SUFFIX) {
            Some(ArchiveKind::Tar)
        } else {
            None
        }
    }
}

/// How the tar reader consumes the background decoder's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Handoff {
    /// Decoder and tar reader run concurrently over a bounded pipe.
    #[default]
    Overlapped,
    /// The decoder runs to completion into an unbounded pipe before the first
    /// entry is read. Holds the whole decoded container in memory.
    DrainFirst,
}

/// Treatment of entry names that would land outside the destination directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathPolicy {
    /// Fail the extraction with `TargzipError::UnsafeEntryPath`.
    #[default]
    Reject,
    /// Drop `..`, root and drive-prefix components and extract what remains.
    Normalize,
}

/// Runtime knobs shared by every archive operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSettings {
    pub copy_buffer_size: usize,
    pub chunk_size: usize,
    pub pipe_capacity: usize,
    pub handoff: Handoff,
    pub path_policy: PathPolicy,
}

impl ArchiveSettings {
    pub const DEFAULT_COPY_BUFFER_SIZE: usize = 64 * 1024;
    pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;
    pub const DEFAULT_PIPE_CAPACITY: usize = 16;

    pub fn with_handoff(mut self, handoff: Handoff) -> Self {
        self.handoff = handoff;
        self
    }

    pub fn with_path_policy(mut self, path_policy: PathPolicy) -> Self {
        self.path_policy = path_policy;
        self
    }
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            copy_buffer_size: Self::DEFAULT_COPY_BUFFER_SIZE,
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
            pipe_capacity: Self::DEFAULT_PIPE_CAPACITY,
            handoff: Handoff::default(),
            path_policy: PathPolicy::default(),
        }
    }
}
