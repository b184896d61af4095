// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Example discovery.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Folder that marks a directory as a buildable example.
pub const SOURCE_DIR_NAME: &str = "src";

/// List the immediate subdirectories of `root` that contain a `src` folder,
/// sorted by name.
pub fn discover_examples(root: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(root).map_err(|source| Error::Read {
        path: root.to_path_buf(),
        source,
    })?;

    let mut examples = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| Error::Read {
            path: root.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_dir() || !path.join(SOURCE_DIR_NAME).is_dir() {
            continue;
        }
        // Non UTF-8 names can't be passed through JSON state or the IDE task list
        match entry.file_name().into_string() {
            Ok(name) => examples.push(name),
            Err(name) => log::warn!("Skipping example with non UTF-8 name {:?}", name),
        }
    }
    examples.sort();
    Ok(examples)
}
