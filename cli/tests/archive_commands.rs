//! # Targzip CLI Archive Command Integration Tests
//!
//! File: cli/tests/archive_commands.rs
//!
//! ## Overview
//!
//! End-to-end runs of `create`, `list`, `extract` and `gunzip` against real files in a
//! temporary directory, for both `.tar` and `.tar.gz` archives.
//!

mod common;
use common::*;
use flate2::write::GzEncoder;
use flate2::Compression;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use tempfile::tempdir;

#[test]
fn test_create_list_extract_tar_gz() {
    let work = tempdir().unwrap();
    sample_tree(work.path());

    targzip_in(work.path())
        .args(["create", "out.tar.gz", "root"])
        .assert()
        .success()
        .stdout(predicate::str::contains("with 4 entries"));
    assert!(!work.path().join("out.tar").exists());

    targzip_in(work.path())
        .args(["list", "out.tar.gz"])
        .assert()
        .success()
        .stdout("root/\nroot/a.txt\nroot/sub/\nroot/sub/b.txt\n");

    targzip_in(work.path())
        .args(["extract", "out.tar.gz", "-C", "restore"])
        .assert()
        .success();
    let restore = work.path().join("restore");
    assert_eq!(fs::read_to_string(restore.join("root/a.txt")).unwrap(), "hello");
    assert_eq!(fs::read_to_string(restore.join("root/sub/b.txt")).unwrap(), "world");
}

#[test]
fn test_create_tar_with_exclude() {
    let work = tempdir().unwrap();
    let root = sample_tree(work.path());
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::write(root.join(".git/HEAD"), "ref: refs/heads/main").unwrap();

    targzip_in(work.path())
        .args(["create", "out.tar", "root", "--exclude", ".git"])
        .assert()
        .success();

    targzip_in(work.path())
        .args(["list", "out.tar"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".git").not())
        .stdout(predicate::str::contains("root/sub/b.txt"));
}

#[test]
fn test_create_children_as_roots() {
    let work = tempdir().unwrap();
    sample_tree(work.path());

    targzip_in(work.path())
        .args(["create", "kids.tar", "root", "--children"])
        .assert()
        .success();

    targzip_in(work.path())
        .args(["list", "kids.tar"])
        .assert()
        .success()
        .stdout("a.txt\nsub/\nsub/b.txt\n");
}

#[test]
fn test_create_with_output_inside_children_dir() {
    let work = tempdir().unwrap();
    sample_tree(work.path());

    for _ in 0..2 {
        targzip_in(work.path())
            .args(["create", "site.tar.gz", ".", "--children"])
            .assert()
            .success();
    }

    targzip_in(work.path())
        .args(["list", "site.tar.gz"])
        .assert()
        .success()
        .stdout("root/\nroot/a.txt\nroot/sub/\nroot/sub/b.txt\n");
}

#[test]
fn test_create_parent_dir_root() {
    let work = tempdir().unwrap();
    let root = sample_tree(work.path());

    targzip_in(&root.join("sub"))
        .args(["create", "../../up.tar", ".."])
        .assert()
        .success();

    targzip_in(work.path())
        .args(["list", "up.tar"])
        .assert()
        .success()
        .stdout("root/\nroot/a.txt\nroot/sub/\nroot/sub/b.txt\n");
}

#[test]
fn test_extract_keeps_file_named_like_intermediate() {
    let work = tempdir().unwrap();
    sample_tree(work.path());
    targzip_in(work.path())
        .args(["create", "backup.tar.gz", "root"])
        .assert()
        .success();
    fs::write(work.path().join("backup.tar"), "USER DATA").unwrap();

    targzip_in(work.path())
        .args(["extract", "backup.tar.gz"])
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(work.path().join("backup.tar")).unwrap(),
        "USER DATA"
    );
}

#[test]
fn test_list_contains_long() {
    let work = tempdir().unwrap();
    sample_tree(work.path());
    targzip_in(work.path())
        .args(["create", "out.tar.gz", "root"])
        .assert()
        .success();

    targzip_in(work.path())
        .args(["list", "out.tar.gz", "--contains", "b.txt", "--long"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^- \d{4} +5 root/sub/b\.txt\n$").unwrap());
}

#[test]
fn test_extract_contains_flattens() {
    let work = tempdir().unwrap();
    sample_tree(work.path());
    targzip_in(work.path())
        .args(["create", "out.tar", "root"])
        .assert()
        .success();

    targzip_in(work.path())
        .args(["extract", "out.tar", "-C", "picked", "--contains", "b.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("b.txt"));
    let picked = work.path().join("picked");
    assert_eq!(fs::read_to_string(picked.join("b.txt")).unwrap(), "world");
    assert!(!picked.join("root").exists());
}

#[test]
fn test_extract_uses_configured_destination() {
    let work = tempdir().unwrap();
    sample_tree(work.path());
    fs::write(
        work.path().join(".targzip.toml"),
        "[extract]\ndefault_destination = \"unpacked\"\n",
    )
    .unwrap();
    targzip_in(work.path())
        .args(["create", "out.tar.gz", "root"])
        .assert()
        .success();

    targzip_in(work.path())
        .args(["extract", "out.tar.gz"])
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(work.path().join("unpacked/root/a.txt")).unwrap(),
        "hello"
    );
}

#[test]
fn test_invalid_config_is_reported() {
    let work = tempdir().unwrap();
    fs::write(work.path().join(".targzip.toml"), "[gzip]\npipe_capacity = 0\n").unwrap();

    targzip_in(work.path())
        .args(["list", "whatever.tar"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("gzip.pipe_capacity must be greater than zero"));
}

#[test]
fn test_unknown_archive_suffix_is_refused() {
    let work = tempdir().unwrap();
    sample_tree(work.path());

    targzip_in(work.path())
        .args(["create", "out.zip", "root"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected a name ending in .tar or .tar.gz"));
    assert!(!work.path().join("out.zip").exists());
}

#[test]
fn test_corrupt_archive_fails() {
    let work = tempdir().unwrap();
    fs::write(work.path().join("broken.tar.gz"), b"this is not gzip").unwrap();

    targzip_in(work.path())
        .args(["list", "broken.tar.gz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:").and(predicate::str::contains("Malformed archive")));
}

#[test]
fn test_gunzip_writes_stripped_name() {
    let work = tempdir().unwrap();
    let gz_path = work.path().join("data.txt.gz");
    let mut encoder = GzEncoder::new(fs::File::create(&gz_path).unwrap(), Compression::default());
    encoder.write_all(b"payload bytes").unwrap();
    encoder.finish().unwrap();

    targzip_in(work.path())
        .args(["gunzip", "data.txt.gz", "-C", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("data.txt"));
    assert_eq!(
        fs::read_to_string(work.path().join("out/data.txt")).unwrap(),
        "payload bytes"
    );
    assert!(gz_path.exists());
}
