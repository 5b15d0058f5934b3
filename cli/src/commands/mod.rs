//! # Targzip Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the subcommands of the `targzip` CLI. Each subcommand lives in
//! its own file with an `XxxArgs` struct parsed by `clap` and a `handle_xxx` function
//! that loads the configuration, runs the archive operation and prints the result.
//!
//! ## Commands
//!
//! - `create`: Build a `.tar` or `.tar.gz` from one or more roots
//! - `list`: Print the entries of an archive
//! - `extract`: Extract an archive, or pull matching files out of it
//! - `gunzip`: Decode a standalone `.gz` file
//!
//! Handlers dispatch on the archive name: `*.tar.gz` goes to the compressed front end,
//! `*.tar` to the plain one, anything else is refused.
//!
use crate::common::archive::ArchiveKind;
use crate::core::error::Result;
use std::path::Path;

pub mod create;
pub mod extract;
pub mod gunzip;
pub mod list;

/// Archive kind of `path`, or an error naming the accepted suffixes.
pub(crate) fn archive_kind(path: &Path) -> Result<ArchiveKind> {
    match ArchiveKind::from_path(path) {
        Some(kind) => Ok(kind),
        None => anyhow::bail!(
            "Cannot tell the archive type of '{}': expected a name ending in .tar or .tar.gz",
            path.display()
        ),
    }
}
