//! # Targzip CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration test crates in `cli/tests/`. Every command runs
//! inside a scratch working directory with `HOME` and `XDG_CONFIG_HOME` pointed into it,
//! so a developer's own `.targzip.toml` or user configuration never leaks into a test.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

/// # Get Targzip Command (`targzip_cmd`)
///
/// An `assert_cmd::Command` for the compiled `targzip` binary.
///
/// ## Panics
/// Panics if the `targzip` binary cannot be found via `Command::cargo_bin`.
pub fn targzip_cmd() -> Command {
    Command::cargo_bin("targzip").expect("Failed to find targzip binary for testing")
}

/// A `targzip` command running in `dir`, isolated from any user configuration.
pub fn targzip_in(dir: &Path) -> Command {
    let mut cmd = targzip_cmd();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".xdg"))
        .env_remove("RUST_LOG");
    cmd
}

/// Creates `root/a.txt` ("hello") and `root/sub/b.txt` ("world") under `base`.
pub fn sample_tree(base: &Path) -> PathBuf {
    let root = base.join("root");
    fs::create_dir_all(root.join("sub")).expect("create sample tree");
    fs::write(root.join("a.txt"), "hello").expect("write a.txt");
    fs::write(root.join("sub/b.txt"), "world").expect("write b.txt");
    root
}
