// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command-line interface definitions.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};

use xplr_common::config::find_top_dir;
use xplr_common::{Config, Environment, Overrides};

use crate::commands::{Options, Session};
use crate::host::{self, SystemHost};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "xplr-do")]
#[command(about = "Build, flash and monitor the XPLR-IOT-1 examples")]
pub struct Cli {
    /// Operation to perform
    #[arg(value_enum)]
    pub operation: Operation,

    /// Name of the example
    #[arg(short, long)]
    pub example: Option<String>,

    /// Pristine build (rebuild)
    #[arg(short, long)]
    pub pristine: bool,

    /// Don't use the bootloader
    #[arg(long, conflicts_with = "bootloader")]
    pub no_bootloader: bool,

    /// Use the bootloader again after --no-bootloader
    #[arg(long)]
    pub bootloader: bool,

    /// Only flash when the build produced a new image
    #[arg(long)]
    pub when_changed: bool,

    /// Root directory for the build output
    #[arg(short = 'd', long)]
    pub build_dir: Option<PathBuf>,

    /// Ubxlib directory
    #[arg(short, long)]
    pub ubxlib_dir: Option<String>,

    /// Uart port name
    #[arg(long)]
    pub uart_name: Option<String>,

    /// Root of the XPLR-IOT-1 tree (defaults to the current directory)
    #[arg(long, env = "DO_TOP_DIR")]
    pub top_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Available operations.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Build the selected example
    Build,
    /// Build, then flash the application core
    Flash,
    /// Flash the network core image
    #[value(name = "flash_net", alias = "flash-net")]
    FlashNet,
    /// Open a raw serial terminal on UART0
    Monitor,
    /// Reset the board through the J-Link probe
    Reset,
    /// Flash, then monitor
    Run,
    /// Flash the serial mcuboot bootloader
    #[value(name = "flash_bootloader", alias = "flash-bootloader")]
    FlashBootloader,
    /// Start a debug session on the built image
    Debug,
    /// Open a shell with the toolchain environment
    Terminal,
    /// Generate the VS Code configuration files
    #[value(name = "vscode_files", alias = "vscode-files")]
    VscodeFiles,
    /// Build, generate the VS Code files and open VS Code
    Vscode,
    /// Make the example the default one and open VS Code
    Select,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        let no_bootloader = if self.no_bootloader {
            Some(true)
        } else if self.bootloader {
            Some(false)
        } else {
            None
        };
        Overrides {
            example: self.example.clone(),
            build_dir: self.build_dir.clone(),
            ubxlib_dir: self.ubxlib_dir.clone(),
            no_bootloader,
            uart_name: self.uart_name.clone(),
        }
    }

    fn options(&self) -> Options {
        Options {
            pristine: self.pristine,
            when_changed: self.when_changed,
        }
    }
}

/// Execute the parsed CLI command.
pub fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get the current directory")?;
    let top_dir = match &cli.top_dir {
        Some(dir) if dir.is_relative() => cwd.join(dir),
        Some(dir) => dir.clone(),
        None => locate_top_dir(&cwd),
    };
    log::debug!("Top directory: {}", top_dir.display());
    let env = Environment {
        top_dir,
        cwd,
        ncs_dir: std::env::var_os("NCS_DIR").map(PathBuf::from),
    };

    let config = Config::resolve(&cli.overrides(), &env)?;
    log::debug!("Resolved configuration: {:?}", config);
    config.persist()?;

    let mut system = SystemHost::new(config.tool_env());
    let has_jlink = host::detect_jlink(&mut system);

    let mut session = Session::new(config, cli.options(), has_jlink, system);
    session.dispatch(cli.operation)
}

/// Tree holding the invoking directory, else the one holding the executable.
/// Falls back to `cwd` so resolution reports the missing `examples/`.
fn locate_top_dir(cwd: &Path) -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let starts = std::iter::once(cwd).chain(exe_dir.as_deref());
    find_top_dir(starts).unwrap_or_else(|| cwd.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_operation_names() {
        let cli = Cli::try_parse_from(["xplr-do", "flash_net"]).unwrap();
        assert_eq!(cli.operation, Operation::FlashNet);
        let cli = Cli::try_parse_from(["xplr-do", "vscode-files"]).unwrap();
        assert_eq!(cli.operation, Operation::VscodeFiles);
        assert!(Cli::try_parse_from(["xplr-do", "explode"]).is_err());
        assert!(Cli::try_parse_from(["xplr-do"]).is_err());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "xplr-do",
            "flash",
            "-e",
            "cell_scan",
            "-p",
            "--when-changed",
            "--no-bootloader",
            "-d",
            "/tmp/out",
            "--uart-name",
            "/dev/ttyUSB0",
        ])
        .unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.example.as_deref(), Some("cell_scan"));
        assert_eq!(overrides.no_bootloader, Some(true));
        assert_eq!(overrides.build_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(overrides.uart_name.as_deref(), Some("/dev/ttyUSB0"));
        assert!(cli.options().pristine);
        assert!(cli.options().when_changed);
    }

    #[test]
    fn test_top_dir_from_nested_directory() {
        let top = std::env::temp_dir().join(format!("xplr-do-{}-cli_top", std::process::id()));
        let nested = top.join("examples").join("blink").join("src");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(locate_top_dir(&nested), top);
        assert_eq!(locate_top_dir(&top), top);
    }

    #[test]
    fn test_bootloader_flags() {
        let cli = Cli::try_parse_from(["xplr-do", "build", "--bootloader"]).unwrap();
        assert_eq!(cli.overrides().no_bootloader, Some(false));
        let cli = Cli::try_parse_from(["xplr-do", "build"]).unwrap();
        assert_eq!(cli.overrides().no_bootloader, None);
        assert!(
            Cli::try_parse_from(["xplr-do", "build", "--bootloader", "--no-bootloader"]).is_err()
        );
    }
}
