// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Resolution of command-line overrides and persisted files into a [`Config`].
//!
//! Precedence is always: explicit flag, then persisted value, then default.
//! Nothing is written to disk until [`Config::persist`] is called, so a
//! resolution error leaves both files untouched.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::{Error, Result};
use crate::examples::{discover_examples, SOURCE_DIR_NAME};
use crate::settings::{Settings, State, SETTINGS_FILE_NAME, STATE_FILE_NAME};

/// Example selected when neither a flag nor the state file names one.
pub const DEFAULT_EXAMPLE: &str = "blink";

/// Values supplied on the command line. `None` means "not given".
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub example: Option<String>,
    pub build_dir: Option<PathBuf>,
    pub ubxlib_dir: Option<String>,
    pub no_bootloader: Option<bool>,
    pub uart_name: Option<String>,
}

/// Process context the resolver depends on.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Root of the XPLR-IOT-1 tree (holds `examples/`, `config/`, `.vscode/`).
    pub top_dir: PathBuf,
    /// Directory the tool was invoked from.
    pub cwd: PathBuf,
    /// nRF Connect SDK root, from `NCS_DIR`.
    pub ncs_dir: Option<PathBuf>,
}

/// Fully resolved configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub top_dir: PathBuf,
    pub cwd: PathBuf,
    pub ncs_dir: PathBuf,
    pub examples_root: PathBuf,
    pub examples: Vec<String>,
    pub example: String,
    pub ubxlib_dir: PathBuf,
    /// Root of all build output; each example builds below it.
    pub build_root: PathBuf,
    /// `build_root/example`.
    pub build_dir: PathBuf,
    pub use_bootloader: bool,
    pub uart_name: Option<String>,
    pub settings: Settings,
    pub state: State,
}

impl Config {
    pub fn resolve(overrides: &Overrides, env: &Environment) -> Result<Self> {
        let ncs_dir = env.ncs_dir.clone().ok_or(Error::MissingNcsDir)?;

        let mut examples_root = env.top_dir.join("examples");
        let mut example = overrides.example.clone();

        // Application living outside the tree: its parent acts as examples root
        if !env.cwd.starts_with(&env.top_dir) && env.cwd.join(SOURCE_DIR_NAME).exists() {
            if let Some(parent) = env.cwd.parent() {
                examples_root = parent.to_path_buf();
            }
            if example.is_none() {
                example = env
                    .cwd
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned());
            }
        }

        if !examples_root.is_dir() {
            return Err(Error::ExamplesDirNotFound(examples_root));
        }
        let examples = discover_examples(&examples_root)?;
        let mut settings = Settings::load(&env.top_dir.join(SETTINGS_FILE_NAME))?;
        let mut state = State::load(&env.cwd.join(STATE_FILE_NAME))?;

        let example = example
            .or_else(|| state.example.clone())
            .unwrap_or_else(|| DEFAULT_EXAMPLE.to_string());
        if !examples.contains(&example) {
            return Err(Error::InvalidExample {
                name: example,
                available: examples,
            });
        }

        if let Some(no_bootloader) = overrides.no_bootloader {
            settings.no_bootloader = Some(no_bootloader);
        }
        if let Some(uart_name) = &overrides.uart_name {
            settings.uart_name = Some(uart_name.clone());
        }

        // Stored anchored to the invoking directory, variables left unexpanded
        if let Some(dir) = &overrides.ubxlib_dir {
            settings.ubxlib_dir = Some(anchor_unexpanded(&env.cwd, dir));
        }
        let ubxlib_raw = settings
            .ubxlib_dir
            .get_or_insert_with(|| env.top_dir.join("ubxlib").to_string_lossy().into_owned());
        // Older relative entries belong to the tree the settings live in
        let ubxlib_dir = absolute(
            &env.top_dir,
            Path::new(expand_vars(ubxlib_raw, |name| std::env::var(name).ok()).as_ref()),
        );
        if !ubxlib_dir.exists() {
            return Err(Error::UbxlibDirNotFound(ubxlib_dir));
        }

        if let Some(dir) = &overrides.build_dir {
            settings.build_dir = Some(absolute(&env.cwd, dir).to_string_lossy().into_owned());
        }
        let build_root = PathBuf::from(
            settings
                .build_dir
                .get_or_insert_with(|| env.top_dir.join("_build").to_string_lossy().into_owned())
                .as_str(),
        );
        let build_dir = build_root.join(&example);

        state.example = Some(example.clone());

        Ok(Config {
            top_dir: env.top_dir.clone(),
            cwd: env.cwd.clone(),
            ncs_dir,
            examples_root,
            examples,
            example,
            ubxlib_dir,
            build_root,
            build_dir,
            use_bootloader: !settings.no_bootloader.unwrap_or(false),
            uart_name: settings.uart_name.clone(),
            settings,
            state,
        })
    }

    /// Write the settings and state files.
    pub fn persist(&self) -> Result<()> {
        self.settings.save(&self.top_dir.join(SETTINGS_FILE_NAME))?;
        self.state.save(&self.cwd.join(STATE_FILE_NAME))
    }

    /// Source directory of the selected example.
    pub fn example_dir(&self) -> PathBuf {
        self.examples_root.join(&self.example)
    }

    /// mcuboot checkout inside the SDK, home of the signing tool and key.
    pub fn mcuboot_dir(&self) -> PathBuf {
        self.ncs_dir.join("bootloader").join("mcuboot")
    }

    /// Variables exported to every child process.
    pub fn tool_env(&self) -> Vec<(String, String)> {
        let mut vars = vec![
            ("DO_TOP_DIR".to_string(), path_string(&self.top_dir)),
            (
                "ZEPHYR_BASE".to_string(),
                path_string(&self.ncs_dir.join("zephyr")).replace('\\', "/"),
            ),
            ("UBXLIB_DIR".to_string(), path_string(&self.ubxlib_dir)),
        ];
        if self.use_bootloader {
            vars.push(("USE_BL".to_string(), "1".to_string()));
        }
        vars
    }
}

/// Expand `$NAME` and `${NAME}` references. Unknown variables are left as is.
pub fn expand_vars<F>(input: &str, lookup: F) -> Cow<'_, str>
where
    F: Fn(&str) -> Option<String>,
{
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\$(?:\{(\w+)\}|(\w+))").expect("valid regex"));
    re.replace_all(input, |caps: &Captures<'_>| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str());
        lookup(name).unwrap_or_else(|| caps[0].to_string())
    })
}

/// First directory, among `starts` and their ancestors, that holds an
/// `examples/` directory.
pub fn find_top_dir<'a, I>(starts: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = &'a Path>,
{
    starts
        .into_iter()
        .flat_map(Path::ancestors)
        .find(|dir| dir.join("examples").is_dir())
        .map(Path::to_path_buf)
}

/// Make a user-supplied path absolute against `base` without expanding its
/// variables. Whether it is relative is judged on the expanded form.
fn anchor_unexpanded(base: &Path, raw: &str) -> String {
    let expanded = expand_vars(raw, |name| std::env::var(name).ok());
    if Path::new(expanded.as_ref()).is_absolute() {
        raw.to_string()
    } else {
        path_string(&base.join(raw))
    }
}

fn absolute(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
