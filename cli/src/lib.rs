//! # Targzip Library Root
//!
//! File: cli/src/lib.rs
//!
//! ## Overview
//!
//! Tar and tar.gz archive creation and extraction over arbitrary collections of file
//! trees. The `targzip` binary is a thin front end over this library.
//!
//! - **`common::archive`**: The archive engine (builders, reader, gzip bridge, decode pipe).
//! - **`common::fs`**: Filesystem helpers and the tree walker the builders enumerate with.
//! - **`core`**: Error types and configuration.
//! - **`commands`**: The CLI subcommand handlers.
//!
pub mod commands;
pub mod common;
pub mod core;
