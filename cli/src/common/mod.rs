//! # Targzip Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared building blocks used by the command handlers:
//!
//! - **`archive`**: Creating, listing and extracting `.tar` / `.tar.gz` archives, plus standalone `.gz` decoding.
//! - **`fs`**: Directory and file creation, chunked copying, scratch file cleanup, and the tree walker (`walk`).
//!

/// Archive builders, readers and the gzip bridge.
pub mod archive;
/// Filesystem I/O helpers and tree enumeration.
pub mod fs;
