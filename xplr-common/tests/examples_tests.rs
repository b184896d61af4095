// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Tests for example discovery.

use std::fs;
use std::path::{Path, PathBuf};

use xplr_common::{discover_examples, Error};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join(name);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_examples_are_sorted() {
    let root = scratch_dir("discover_sorted");
    for name in ["sensors", "ble_nus", "cell_scan", "aoa_tag"] {
        fs::create_dir_all(root.join(name).join("src")).unwrap();
    }

    assert_eq!(
        discover_examples(&root).unwrap(),
        ["aoa_tag", "ble_nus", "cell_scan", "sensors"]
    );
}

#[test]
fn test_directories_without_src_are_excluded() {
    let root = scratch_dir("discover_no_src");
    fs::create_dir_all(root.join("blink").join("src")).unwrap();
    fs::create_dir_all(root.join("common").join("include")).unwrap();
    fs::create_dir_all(root.join("docs")).unwrap();

    assert_eq!(discover_examples(&root).unwrap(), ["blink"]);
}

#[test]
fn test_plain_files_are_ignored() {
    let root = scratch_dir("discover_files");
    fs::create_dir_all(root.join("nfc").join("src")).unwrap();
    fs::write(root.join("README.md"), "examples").unwrap();
    // A file named src does not make an example
    fs::create_dir_all(root.join("broken")).unwrap();
    fs::write(root.join("broken").join("src"), "").unwrap();

    assert_eq!(discover_examples(&root).unwrap(), ["nfc"]);
}

#[test]
fn test_empty_root() {
    let root = scratch_dir("discover_empty");
    assert!(discover_examples(&root).unwrap().is_empty());
}

#[test]
fn test_missing_root_is_an_error() {
    let root = scratch_dir("discover_missing").join("examples");
    assert!(matches!(
        discover_examples(&root),
        Err(Error::Read { .. })
    ));
}
