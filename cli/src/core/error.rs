//! # Targzip Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types and error handling mechanisms used throughout
//! targzip. Every archive operation either fully succeeds or returns a single error
//! value carrying the original cause; there are no partial-result-plus-error returns.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `TargzipError`: A custom error enum using `thiserror`, one variant per failure kind
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for flexible error handling
//!
//! The error kinds cover:
//! - I/O failures (unreadable source, unwritable destination, disk exhaustion, broken pipe)
//! - Malformed archives (truncated entries, invalid tar or gzip framing)
//! - Background decode worker failures
//! - Unsafe entry names rejected by the extraction path policy
//! - Naming convention violations (`.tar.gz`, `.gz` suffixes)
//! - Configuration and filesystem precondition errors
//!
//! ## Examples
//!
//! Distinguishing a corrupt archive from an unreadable one:
//!
//! ```rust,ignore
//! match tar_gz::view_path(path, &settings) {
//!     Ok(names) => println!("{} entries", names.len()),
//!     Err(e) if e.downcast_ref::<TargzipError>().is_some_and(TargzipError::is_malformed) => {
//!         eprintln!("archive is damaged: {e}");
//!     }
//!     Err(e) => return Err(e),
//! }
//! ```
//!
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error type for targzip.
#[derive(Error, Debug)]
pub enum TargzipError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Malformed archive while {context}: {source}")]
    MalformedArchive {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Background decode worker failed: {0}")]
    WorkerFailed(String),

    #[error("Archive entry '{name}' escapes the destination directory")]
    UnsafeEntryPath { name: String },

    #[error("'{}' does not end with the expected '{expected}' suffix", path.display())]
    UnrecognizedSuffix { path: PathBuf, expected: &'static str },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filesystem error: {0}")]
    FileSystem(String),
}

impl TargzipError {
    /// Wraps an I/O error raised by the filesystem (opening, creating, writing files).
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        TargzipError::Io {
            context: context.into(),
            source,
        }
    }

    /// Wraps an I/O error raised while reading archive framing.
    ///
    /// The tar and gzip codecs report bad framing through `io::Error` as well, so the
    /// kind decides the bucket: `InvalidData`, `InvalidInput`, `UnexpectedEof` and the
    /// catch-all `Other` (used by `tar` for checksum and header failures) are treated as
    /// a malformed archive, everything else stays an I/O failure.
    pub fn from_archive_read(context: impl Into<String>, source: io::Error) -> Self {
        let context = context.into();
        match source.kind() {
            io::ErrorKind::InvalidData
            | io::ErrorKind::InvalidInput
            | io::ErrorKind::UnexpectedEof
            | io::ErrorKind::Other => TargzipError::MalformedArchive { context, source },
            _ => TargzipError::Io { context, source },
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, TargzipError::MalformedArchive { .. })
    }

    pub fn is_io(&self) -> bool {
        matches!(self, TargzipError::Io { .. })
    }
}

/// Type alias for Result using anyhow::Error for broad compatibility.
/// Anyhow allows for easy context addition and flexible error handling.
pub type Result<T> = anyhow::Result<T>;

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let config_err = TargzipError::Config("pipe_capacity must be greater than zero".to_string());
        assert_eq!(
            config_err.to_string(),
            "Configuration error: pipe_capacity must be greater than zero"
        );

        let unsafe_path = TargzipError::UnsafeEntryPath {
            name: "../etc/passwd".into(),
        };
        assert_eq!(
            unsafe_path.to_string(),
            "Archive entry '../etc/passwd' escapes the destination directory"
        );

        let suffix = TargzipError::UnrecognizedSuffix {
            path: PathBuf::from("out.zip"),
            expected: ".tar.gz",
        };
        assert_eq!(
            suffix.to_string(),
            "'out.zip' does not end with the expected '.tar.gz' suffix"
        );
    }

    #[test]
    fn test_archive_read_classification() {
        let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "truncated entry");
        assert!(TargzipError::from_archive_read("reading entry", eof).is_malformed());

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = TargzipError::from_archive_read("opening archive", denied);
        assert!(err.is_io());
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = TargzipError::WorkerFailed("panicked".into()).into();
        let err = err.context("listing archive");
        assert!(matches!(
            err.downcast_ref::<TargzipError>(),
            Some(TargzipError::WorkerFailed(_))
        ));
    }
}
