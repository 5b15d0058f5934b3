//! # Targzip Filesystem I/O Operations
//!
//! File: cli/src/common/fs/io.rs
//!

//! ## Overview
//!
//! This module centralizes the filesystem input/output operations the archive
//! engine relies on: ensuring destination directories exist, creating destination
//! files (with their parent directories), streaming bytes through a fixed-size
//! buffer, and the best-effort removal of scratch files.
//!
//! ## Architecture
//!
//! - **`ensure_dir_exists`**: Creates a directory and its ancestors if missing. Fails if the path exists but is not a directory.
//! - **`create_file_with_parents`**: Creates (truncating) a file after making sure its parent directory exists.
//! - **`copy_chunked`**: Streams a reader into a writer through a buffer of caller-chosen size, so whole files are never held in memory.
//! - **`remove_file_best_effort`**: Deletes a scratch file, logging rather than reporting a failure.
//!
//! All I/O errors are wrapped in `TargzipError::Io` with the offending path in the context,
//! so callers can tell I/O failures apart from malformed archives.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::common::fs::io;
//!
//! io::ensure_dir_exists(dest)?;
//! let mut out = io::create_file_with_parents(&dest.join("root/a.txt"))?;
//! io::copy_chunked(&mut entry, &mut out, settings.copy_buffer_size)?;
//! ```
//!
use crate::core::error::{Result, TargzipError}; // Use standard Result and custom Error types
use std::fs::{self, File}; // Standard filesystem module
use std::io::{self, Read, Write};
use std::path::Path; // Filesystem path type
use tracing::{debug, warn}; // Logging utilities

/// Ensures that a directory exists at the specified path.
///
/// If the path does not exist, this function attempts to create the directory,
/// including any necessary parent directories (similar to `mkdir -p`).
/// If the path already exists but is not a directory (e.g., it's a file),
/// an error (`TargzipError::FileSystem`) is returned.
///
/// # Errors
///
/// Returns an `Err` if:
/// - The path exists but is not a directory.
/// - Creating the directory fails (e.g., due to permissions).
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        // Path does not exist, attempt to create it recursively.
        fs::create_dir_all(path).map_err(|e| {
            TargzipError::io(format!("creating directory {}", path.display()), e)
        })?;
        debug!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        // It exists but is not a directory (e.g., a file).
        anyhow::bail!(TargzipError::FileSystem(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Creates (or truncates) the file at `path`, creating its parent directory first.
///
/// The returned handle is unbuffered; wrap it in a `BufWriter` for small writes.
pub fn create_file_with_parents(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir_exists(parent)?;
        }
    }
    File::create(path)
        .map_err(|e| TargzipError::io(format!("creating file {}", path.display()), e).into())
}

/// Opens an existing file for reading, wrapping failures as `TargzipError::Io`.
pub fn open_file(path: &Path) -> Result<File> {
    File::open(path)
        .map_err(|e| TargzipError::io(format!("opening {}", path.display()), e).into())
}

/// Which side of a `copy_chunked` call failed.
#[derive(Debug)]
pub enum CopyError {
    Read(io::Error),
    Write(io::Error),
}

/// Copies everything from `reader` into `writer` through a fixed `buffer_size` buffer.
///
/// Returns the number of bytes copied. The writer is flushed before returning. Errors are
/// tagged with the side they came from so callers can classify a failing archive stream
/// differently from a failing destination.
pub fn copy_chunked<R, W>(
    reader: &mut R,
    writer: &mut W,
    buffer_size: usize,
) -> std::result::Result<u64, CopyError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };
        writer.write_all(&buf[..n]).map_err(CopyError::Write)?;
        total += n as u64;
    }
    writer.flush().map_err(CopyError::Write)?;
    Ok(total)
}

/// Deletes a scratch file. Failure is logged at `warn` level and otherwise ignored.
pub fn remove_file_best_effort(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("Removed scratch file: {:?}", path),
        Err(e) => warn!("Could not remove scratch file {:?}: {}", path, e),
    }
}
