//! # Targzip List Command
//!
//! File: cli/src/commands/list.rs
//!
//! ## Overview
//!
//! Implements `targzip list`, which prints the entries of a `.tar` or `.tar.gz` archive
//! in archive order, one per line.
//!
//! ```bash
//! targzip list backup.tar.gz
//! targzip list backup.tar.gz --contains nginx --long
//! ```
//!
//! Long format columns: type (`d` or `-`), permission bits in octal, size in bytes, name.
//!
use super::archive_kind;
use crate::common::archive::{tar, tar_gz, ArchiveEntry, ArchiveKind};
use crate::core::config;
use crate::core::error::Result;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Arguments for `targzip list`.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Archive to read.
    pub archive: PathBuf,

    /// Only show entries whose name contains TEXT.
    #[arg(long, value_name = "TEXT")]
    pub contains: Option<String>,

    /// Show type, permissions and size for each entry.
    #[arg(short, long)]
    pub long: bool,
}

/// Handles `targzip list`.
pub fn handle_list(args: ListArgs) -> Result<()> {
    info!("Handling list command for {}", args.archive.display());
    let settings = config::load_config()
        .context("Failed to load targzip configuration")?
        .settings();
    let kind = archive_kind(&args.archive)?;
    let context = || format!("Failed to read archive '{}'", args.archive.display());

    if args.contains.is_none() && !args.long {
        let names = match kind {
            ArchiveKind::Tar => tar::view_path(&args.archive, &settings),
            ArchiveKind::TarGz => tar_gz::view_path(&args.archive, &settings),
        }
        .with_context(context)?;
        for name in names {
            println!("{name}");
        }
        return Ok(());
    }

    let needle = args.contains.as_deref().unwrap_or_default();
    let predicate = |entry: &ArchiveEntry| entry.name.contains(needle);
    let entries = match kind {
        ArchiveKind::Tar => tar::entries_matching(&args.archive, predicate, &settings),
        ArchiveKind::TarGz => tar_gz::entries_matching(&args.archive, predicate, &settings),
    }
    .with_context(context)?;
    for entry in &entries {
        if args.long {
            println!("{}", format_long(entry));
        } else {
            println!("{}", entry.name);
        }
    }
    Ok(())
}

fn format_long(entry: &ArchiveEntry) -> String {
    let kind = if entry.is_dir { 'd' } else { '-' };
    let mode = entry
        .mode
        .map(|m| format!("{:04o}", m & 0o7777))
        .unwrap_or_else(|| "????".to_string());
    format!("{kind} {mode} {:>12} {}", entry.size, entry.name)
}
