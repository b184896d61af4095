// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Common types and utilities for xplr-do.
//!
//! Everything here is free of process spawning so it can be tested against
//! scratch directories:
//! - `settings`: persisted `.settings` / `.state` JSON files
//! - `examples`: discovery of buildable examples
//! - `config`: resolution of flags + persisted values into a [`Config`]
//! - `image`: build-output image paths
//! - `ninja`: compiler flags scraped from a generated `build.ninja`
//! - `ide`: VS Code template rendering

pub mod config;
pub mod error;
pub mod examples;
pub mod ide;
pub mod image;
pub mod ninja;
pub mod settings;

// Re-export commonly used types
pub use config::{Config, Environment, Overrides};
pub use error::{Error, Result};
pub use examples::discover_examples;
pub use image::{Core, ImageFormat, ImageSpec};
pub use ninja::CompileFlags;
pub use settings::{Settings, State, SETTINGS_FILE_NAME, STATE_FILE_NAME};
