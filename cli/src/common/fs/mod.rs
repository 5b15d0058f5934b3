//! # Targzip Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!

//! ## Overview
//!
//! This module groups the filesystem-facing pieces the archive engine is built on:
//! low-level file I/O helpers and the tree walker that enumerates archive roots.
//!
//! ## Architecture
//!
//! - **`io`**: Directory creation, destination file creation, chunked stream copies and best-effort scratch file removal.
//! - **`walk`**: `FileCollection`, one root to archive, and its predicate-pruned depth-first `scan`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::common::fs::{io, walk::FileCollection};
//!
//! io::ensure_dir_exists(dest)?;
//! FileCollection::of(root)?.scan(None, |visited| Ok(()))?;
//! ```
//!

/// Basic file I/O operations (e.g., `ensure_dir_exists`, `create_file_with_parents`, `copy_chunked`).
pub mod io;
/// Tree enumeration of archive roots (`FileCollection`).
pub mod walk;
