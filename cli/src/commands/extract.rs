//! # Targzip Extract Command
//!
//! File: cli/src/commands/extract.rs
//!
//! ## Overview
//!
//! Implements `targzip extract`.
//!
//! Without `--contains` the whole archive is restored under the destination, recreating
//! its directory structure. With `--contains TEXT` only file entries whose name contains
//! TEXT are written, each directly into the destination under its last path segment.
//!
//! The destination defaults to `[extract] default_destination` from the configuration.
//! Entries whose names would escape the destination are handled per `[extract] path_policy`.
//!
//! ```bash
//! targzip extract backup.tar.gz -C /restore
//! targzip extract backup.tar.gz -C /tmp/confs --contains .conf
//! ```
//!
use super::archive_kind;
use crate::common::archive::{tar, tar_gz, ArchiveEntry, ArchiveKind};
use crate::core::config;
use crate::core::error::Result;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Arguments for `targzip extract`.
#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Archive to extract.
    pub archive: PathBuf,

    /// Destination directory (created when missing).
    #[arg(short = 'C', long = "directory", value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Only write file entries whose name contains TEXT, flattened into DIR.
    #[arg(long, value_name = "TEXT")]
    pub contains: Option<String>,
}

/// Handles `targzip extract`.
pub fn handle_extract(args: ExtractArgs) -> Result<()> {
    info!("Handling extract command for {}", args.archive.display());
    let cfg = config::load_config().context("Failed to load targzip configuration")?;
    let settings = cfg.settings();
    let kind = archive_kind(&args.archive)?;
    let dest = args
        .directory
        .clone()
        .unwrap_or_else(|| PathBuf::from(&cfg.extract.default_destination));
    let context = || {
        format!(
            "Failed to extract '{}' into '{}'",
            args.archive.display(),
            dest.display()
        )
    };

    match args.contains.as_deref() {
        Some(needle) => {
            let predicate = |entry: &ArchiveEntry| entry.name.contains(needle);
            let written = match kind {
                ArchiveKind::Tar => tar::predicate_open(&args.archive, &dest, predicate, &settings),
                ArchiveKind::TarGz => {
                    tar_gz::predicate_open(&args.archive, &dest, predicate, &settings)
                }
            }
            .with_context(context)?;
            for path in &written {
                println!("{}", path.display());
            }
        }
        None => {
            let names = match kind {
                ArchiveKind::Tar => tar::decompress(&args.archive, &dest, &settings),
                ArchiveKind::TarGz => tar_gz::decompress(&args.archive, &dest, &settings),
            }
            .with_context(context)?;
            println!("Extracted {} entries into {}", names.len(), dest.display());
        }
    }
    Ok(())
}
