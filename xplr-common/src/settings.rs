// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Persisted settings and state files.
//!
//! Both are flat JSON objects. Keys this tool does not know about are kept in
//! `extra` so that rewriting a file never drops them.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Settings file name, relative to the tool's top directory.
pub const SETTINGS_FILE_NAME: &str = ".settings";

/// State file name, relative to the invoking directory.
pub const STATE_FILE_NAME: &str = ".state";

/// Per-project toolchain and build preferences.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ubxlib_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_bootloader: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uart_name: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Last-used selections.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct State {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Settings {
    /// Load settings, or defaults when the file does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        load_or_default(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_json(self, path)
    }
}

impl State {
    /// Load state, or defaults when the file does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        load_or_default(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_json(self, path)
    }
}

fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        log::debug!("{} not found, using defaults", path.display());
        return Ok(T::default());
    }
    let text = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, text).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}
