// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Compiler flags scraped from a CMake-generated `build.ninja`.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Preprocessor defines and include directories of the build.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompileFlags {
    pub defines: Vec<String>,
    pub includes: Vec<String>,
}

fn define_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-D(\S+)").expect("valid regex"))
}

fn include_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-I(\S+)").expect("valid regex"))
}

impl CompileFlags {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Collect `-D` tokens from every `DEFINES = ` line and `-I` tokens from
    /// the first `INCLUDES = ` line. Scanning stops after that line.
    pub fn parse(text: &str) -> Self {
        let mut flags = CompileFlags::default();
        for line in text.lines() {
            if line.contains("DEFINES = ") {
                flags.defines.extend(
                    define_re()
                        .captures_iter(line)
                        .map(|c| c[1].replace("\\\\", "")),
                );
            } else if line.contains("INCLUDES = ") {
                flags
                    .includes
                    .extend(include_re().captures_iter(line).map(|c| c[1].to_string()));
                break;
            }
        }
        flags
    }

    /// Defines as the body of a JSON string array, one entry per line.
    pub fn defines_block(&self) -> String {
        json_lines(&self.defines)
    }

    /// Includes as the body of a JSON string array, one entry per line.
    pub fn includes_block(&self) -> String {
        json_lines(&self.includes)
    }
}

fn json_lines(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("        \"{}\"", item))
        .collect::<Vec<_>>()
        .join(",\n")
}
