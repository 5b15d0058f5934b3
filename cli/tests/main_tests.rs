//! # Targzip CLI Main Integration Tests
//!
//! File: cli/tests/main_tests.rs
//!
//! ## Overview
//!
//! Top-level behavior of the `targzip` binary: standard flags, help output and argument
//! errors.
//!

mod common;
use common::*;
use predicates::prelude::*;

#[test]
fn test_main_help_flag() {
    targzip_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("create")
                .and(predicate::str::contains("list"))
                .and(predicate::str::contains("extract"))
                .and(predicate::str::contains("gunzip")),
        );
}

#[test]
fn test_main_version_flag() {
    targzip_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_subcommand_version_is_propagated() {
    targzip_cmd()
        .args(["list", "--version"])
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_subcommand_fails() {
    targzip_cmd().assert().failure();
}

#[test]
fn test_create_requires_roots() {
    targzip_cmd()
        .args(["create", "out.tar"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}
