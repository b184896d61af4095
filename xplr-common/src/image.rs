// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Firmware image locations inside a Zephyr build directory.

use std::path::{Path, PathBuf};

/// nRF5340 core an image is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Core {
    App,
    Net,
}

/// Image container, chosen by the flashing path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Intel HEX, programmed through the J-Link probe.
    Hex,
    /// Raw binary, uploaded through the serial bootloader.
    Bin,
}

impl ImageFormat {
    pub fn for_probe(has_jlink: bool) -> Self {
        if has_jlink {
            ImageFormat::Hex
        } else {
            ImageFormat::Bin
        }
    }

    fn extension(self) -> &'static str {
        match self {
            ImageFormat::Hex => "hex",
            ImageFormat::Bin => "bin",
        }
    }
}

/// Identifies one image variant produced by a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSpec {
    pub core: Core,
    pub format: ImageFormat,
    pub signed: bool,
}

impl ImageSpec {
    pub fn new(core: Core, format: ImageFormat, signed: bool) -> Self {
        Self {
            core,
            format,
            signed,
        }
    }

    /// Same variant with the signed flag set.
    pub fn signed(self) -> Self {
        Self {
            signed: true,
            ..self
        }
    }

    /// Path of this image below `build_dir`.
    ///
    /// The network core is built as the `hci_rpmsg` child image.
    pub fn path(&self, build_dir: &Path) -> PathBuf {
        let zephyr_dir = match self.core {
            Core::App => build_dir.join("zephyr"),
            Core::Net => build_dir.join("hci_rpmsg").join("zephyr"),
        };
        let suffix = if self.signed { "_signed" } else { "" };
        zephyr_dir.join(format!("zephyr{}.{}", suffix, self.format.extension()))
    }
}
