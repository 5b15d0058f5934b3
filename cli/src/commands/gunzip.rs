//! # Targzip Gunzip Command
//!
//! File: cli/src/commands/gunzip.rs
//!
//! ## Overview
//!
//! Implements `targzip gunzip`, which decodes a single `.gz` file into a directory under
//! its own name minus the `.gz` suffix (`data.txt.gz` becomes `DIR/data.txt`). The input
//! file is left in place.
//!
use crate::common::archive::compression;
use crate::core::config;
use crate::core::error::Result;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Arguments for `targzip gunzip`.
#[derive(Parser, Debug)]
pub struct GunzipArgs {
    /// Gzip file to decode.
    pub file: PathBuf,

    /// Destination directory (created when missing).
    #[arg(short = 'C', long = "directory", value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

/// Handles `targzip gunzip`.
pub fn handle_gunzip(args: GunzipArgs) -> Result<()> {
    info!("Handling gunzip command for {}", args.file.display());
    let cfg = config::load_config().context("Failed to load targzip configuration")?;
    let dest = args
        .directory
        .unwrap_or_else(|| PathBuf::from(&cfg.extract.default_destination));
    let written = compression::open_gz(&args.file, &dest, &cfg.settings())
        .with_context(|| format!("Failed to decompress '{}'", args.file.display()))?;
    println!("{}", written.display());
    Ok(())
}
