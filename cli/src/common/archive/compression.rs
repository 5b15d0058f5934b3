//! # Targzip Compression Bridge (`common::archive::compression`)
//!
//! File: cli/src/common/archive/compression.rs
//!
//! ## Overview
//!
//! Whole-file gzip helpers built on `flate2`. Compressed archive creation writes a plain
//! tar first and then runs it through `gzip_file`; `open_gz` decodes a standalone `.gz`
//! file into a directory, and `gunzip_into` decodes into a file the caller already holds. Streaming decode of `.tar.gz` for reading lives in `pipe`.
//!
//! The gzip container is standard (RFC 1952, DEFLATE, default level), so anything these
//! functions write is readable by `gzip -d` and vice versa.
//!
use super::{naming, ArchiveSettings};
use crate::common::fs::io::{self as fsio, CopyError};
use crate::core::error::{Result, TargzipError};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Gzip-compresses `src` into `dst` (created or truncated). Returns the uncompressed size.
pub fn gzip_file(src: &Path, dst: &Path, settings: &ArchiveSettings) -> Result<u64> {
    debug!("Compressing {} -> {}", src.display(), dst.display());
    let mut input = fsio::open_file(src)?;
    let output = fsio::create_file_with_parents(dst)?;
    let mut encoder = GzEncoder::new(output, Compression::default());

    let copied = fsio::copy_chunked(&mut input, &mut encoder, settings.copy_buffer_size)
        .map_err(|e| match e {
            CopyError::Read(source) => TargzipError::io(format!("reading {}", src.display()), source),
            CopyError::Write(source) => {
                TargzipError::io(format!("compressing into {}", dst.display()), source)
            }
        })?;
    let output = encoder
        .finish()
        .map_err(|e| TargzipError::io(format!("finishing gzip stream {}", dst.display()), e))?;
    output
        .sync_all()
        .map_err(|e| TargzipError::io(format!("syncing {}", dst.display()), e))?;
    Ok(copied)
}

/// Decodes the gzip file `src` into `dst`. Returns the decoded size.
///
/// Corrupt or truncated input fails with `TargzipError::MalformedArchive`; `dst` is left
/// behind with whatever was decoded before the failure.
pub fn gunzip_file(src: &Path, dst: &Path, settings: &ArchiveSettings) -> Result<u64> {
    let input = fsio::open_file(src)?;
    let mut output = fsio::create_file_with_parents(dst)?;
    decode(src, input, &mut output, dst, settings)
}

/// Decodes the gzip file `src` into an already open `output`, which `dst` names in
/// logs and errors. Returns the decoded size.
pub fn gunzip_into<W>(src: &Path, output: &mut W, dst: &Path, settings: &ArchiveSettings) -> Result<u64>
where
    W: Write + ?Sized,
{
    let input = fsio::open_file(src)?;
    decode(src, input, output, dst, settings)
}

fn decode<W>(src: &Path, input: File, output: &mut W, dst: &Path, settings: &ArchiveSettings) -> Result<u64>
where
    W: Write + ?Sized,
{
    debug!("Decompressing {} -> {}", src.display(), dst.display());
    let mut decoder = GzDecoder::new(BufReader::new(input));
    let decoded = fsio::copy_chunked(&mut decoder, output, settings.copy_buffer_size)
        .map_err(|e| match e {
            CopyError::Read(source) => {
                TargzipError::from_archive_read(format!("decoding {}", src.display()), source)
            }
            CopyError::Write(source) => TargzipError::io(format!("writing {}", dst.display()), source),
        })?;
    Ok(decoded)
}

/// Decodes the standalone `.gz` file at `gz_path` into `dir`, under its file name minus `.gz`.
///
/// `dir` is created when missing. Returns the path written.
pub fn open_gz(gz_path: &Path, dir: &Path, settings: &ArchiveSettings) -> Result<PathBuf> {
    let name = naming::gunzipped_file_name(gz_path)?;
    fsio::ensure_dir_exists(dir)?;
    let target = dir.join(name);
    let decoded = gunzip_file(gz_path, &target, settings)?;
    info!(
        "Decompressed {} into {} ({} bytes)",
        gz_path.display(),
        target.display(),
        decoded
    );
    Ok(target)
}
