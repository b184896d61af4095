// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Error type shared by the library modules.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("NCS_DIR is not set, this tool must be run via the \"do\" command")]
    MissingNcsDir,

    #[error("No examples directory at {}\nRun from the XPLR-IOT-1 tree or set DO_TOP_DIR", .0.display())]
    ExamplesDirNotFound(PathBuf),

    #[error("Ubxlib directory not found: {}", .0.display())]
    UbxlibDirNotFound(PathBuf),

    #[error("Invalid example \"{name}\"\nAvailable: {available:?}")]
    InvalidExample {
        name: String,
        available: Vec<String>,
    },

    #[error("Failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
