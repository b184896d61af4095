// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Operation implementations.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use anyhow::{bail, Result};

use xplr_common::{Config, Core, ImageFormat, ImageSpec};

use crate::cli::Operation;
use crate::host::{Host, ToolCommand};
use crate::monitor;

/// Zephyr board the examples are built for.
const BOARD: &str = "nrf5340dk_nrf5340_cpuapp";

/// mcuboot signing parameters matching the XPLR-IOT-1 partition layout.
const SIGN_HEADER_SIZE: &str = "0x200";
const SIGN_ALIGN: &str = "4";
const SIGN_VERSION: &str = "0.0.0+0";
const SIGN_SLOT_SIZE: &str = "0xe0000";

#[cfg(windows)]
const PYTHON: &str = "python";
#[cfg(not(windows))]
const PYTHON: &str = "python3";

/// Per-invocation flags that are not persisted.
#[derive(Debug, Default, Clone, Copy)]
pub struct Options {
    pub pristine: bool,
    pub when_changed: bool,
}

/// Result of a successful build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The image was (re)written by this build.
    Fresh,
    /// The build system had nothing to do.
    UpToDate,
}

/// Everything an operation needs, built once in [`crate::cli::run`].
pub struct Session<H: Host> {
    pub(crate) config: Config,
    pub(crate) options: Options,
    pub(crate) has_jlink: bool,
    pub(crate) host: H,
}

impl<H: Host> Session<H> {
    pub fn new(config: Config, options: Options, has_jlink: bool, host: H) -> Self {
        Self {
            config,
            options,
            has_jlink,
            host,
        }
    }

    pub fn dispatch(&mut self, operation: Operation) -> Result<()> {
        log::debug!("Operation {:?} on example {}", operation, self.config.example);
        match operation {
            Operation::Build => self.build().map(|_| ()),
            Operation::Flash => self.flash(),
            Operation::FlashNet => self.flash_net(),
            Operation::Monitor => self.monitor(),
            Operation::Reset => self.reset(),
            Operation::Run => self.run(),
            Operation::FlashBootloader => self.flash_bootloader(),
            Operation::Debug => self.debug(),
            Operation::Terminal => self.terminal(),
            Operation::VscodeFiles => self.vscode_files(),
            Operation::Vscode => self.vscode(),
            Operation::Select => self.select(),
        }
    }

    /// Run a tool and fail on a non-zero exit.
    pub(crate) fn exec(&mut self, cmd: &ToolCommand) -> Result<()> {
        if !self.host.status(cmd)? {
            bail!("{} failed", cmd.program_name());
        }
        Ok(())
    }

    /// Build the selected example and sign freshly built images.
    pub fn build(&mut self) -> Result<BuildOutcome> {
        println!("=== {} ===", self.config.example);

        let mut cmd = ToolCommand::new("west")
            .args(["build", "--board", BOARD, "--build-dir"])
            .arg(&self.config.build_dir)
            .current_dir(self.config.example_dir());
        if self.options.pristine {
            cmd = cmd.arg("--pristine");
        }

        let started = Instant::now();
        let start_time = SystemTime::now();
        let built = self.host.status(&cmd)?;

        let mut outcome = BuildOutcome::UpToDate;
        if built {
            let image = ImageSpec::new(Core::App, ImageFormat::Bin, false);
            if modified_since(&image.path(&self.config.build_dir), start_time) {
                outcome = BuildOutcome::Fresh;
                if self.config.use_bootloader {
                    self.sign_images()?;
                }
            }
        }
        println!("= Elapsed time: {}", format_elapsed(started.elapsed()));

        if !built {
            bail!("Build failed");
        }
        log::info!("Build of {} is {:?}", self.config.example, outcome);
        Ok(outcome)
    }

    /// Produce a signed counterpart for every unsigned application image.
    fn sign_images(&mut self) -> Result<()> {
        let mcuboot = self.config.mcuboot_dir();
        for format in [ImageFormat::Bin, ImageFormat::Hex] {
            let unsigned = ImageSpec::new(Core::App, format, false);
            let input = unsigned.path(&self.config.build_dir);
            if !input.exists() {
                continue;
            }
            let output = unsigned.signed().path(&self.config.build_dir);
            let cmd = ToolCommand::new(PYTHON)
                .arg(mcuboot.join("scripts").join("imgtool.py"))
                .arg("sign")
                .arg("--key")
                .arg(mcuboot.join("root-rsa-2048.pem"))
                .args(["--header-size", SIGN_HEADER_SIZE])
                .args(["--align", SIGN_ALIGN])
                .args(["--version", SIGN_VERSION])
                .arg("--pad-header")
                .args(["--slot-size", SIGN_SLOT_SIZE])
                .arg(&input)
                .arg(&output);
            log::info!("Signing {}", input.display());
            self.exec(&cmd)?;
        }
        Ok(())
    }

    /// Build, then flash the application core unless `--when-changed`
    /// found nothing new.
    pub fn flash(&mut self) -> Result<()> {
        if self.build()? == BuildOutcome::UpToDate && self.options.when_changed {
            println!("Image unchanged, not flashing");
            return Ok(());
        }
        let image = ImageSpec::new(
            Core::App,
            ImageFormat::for_probe(self.has_jlink),
            self.config.use_bootloader,
        );
        self.flash_file(&image.path(&self.config.build_dir), Core::App)
    }

    /// Flash the (unsigned) network core image from the last build.
    pub fn flash_net(&mut self) -> Result<()> {
        let image = ImageSpec::new(Core::Net, ImageFormat::for_probe(self.has_jlink), false);
        self.flash_file(&image.path(&self.config.build_dir), Core::Net)
    }

    fn flash_file(&mut self, file: &Path, core: Core) -> Result<()> {
        if !file.exists() {
            bail!("File not found: {}", file.display());
        }

        if self.has_jlink {
            println!("Flashing {} using jlink", file.display());
            let coprocessor = match core {
                Core::App => "CP_APPLICATION",
                Core::Net => "CP_NETWORK",
            };
            let cmd = nrfjprog()
                .args(["--coprocessor", coprocessor, "--program"])
                .arg(file)
                .args(["--sectorerase", "--verify", "--reset"]);
            return self.exec(&cmd);
        }

        println!("Flashing using serial port");
        let port = self.uart0()?;
        println!("Restart the XPLR-IOT-1 simultaneously pressing button 1");
        self.host.confirm("Press return when ready: ")?;
        let upload = self.newtmgr(&port).args(["image", "upload"]).arg(file);
        self.exec(&upload)?;

        println!("Restarting");
        let reset = self.newtmgr(&port).arg("reset");
        self.exec(&reset)
    }

    fn newtmgr(&self, port: &str) -> ToolCommand {
        let program = self
            .config
            .top_dir
            .join(format!("newtmgr{}", std::env::consts::EXE_SUFFIX));
        ToolCommand::new(program)
            .args(["--conntype", "serial", "--connstring"])
            .arg(format!("{},baud={}", port, monitor::BAUD_RATE))
    }

    /// Configured UART name, or the detected one.
    fn uart0(&self) -> Result<String> {
        match &self.config.uart_name {
            Some(name) => Ok(name.clone()),
            None => monitor::detect_uart0(),
        }
    }

    pub fn monitor(&mut self) -> Result<()> {
        let port = self.uart0()?;
        monitor::run_terminal(&port, monitor::BAUD_RATE)
    }

    pub fn reset(&mut self) -> Result<()> {
        if !self.has_jlink {
            log::warn!("Reset needs a J-Link probe, none detected");
            return Ok(());
        }
        self.exec(&nrfjprog().arg("--reset"))
    }

    pub fn run(&mut self) -> Result<()> {
        self.flash()?;
        self.monitor()
    }

    pub fn flash_bootloader(&mut self) -> Result<()> {
        let hex = self
            .config
            .top_dir
            .join("config")
            .join("mcuboot_serial.hex");
        if !hex.exists() {
            bail!("File not found: {}", hex.display());
        }
        println!("Flashing serial mcuboot bootloader...");
        let cmd = nrfjprog()
            .arg("--program")
            .arg(&hex)
            .args(["--sectorerase", "--reset", "--verify"]);
        self.exec(&cmd)
    }

    pub fn debug(&mut self) -> Result<()> {
        let cmd = ToolCommand::new("west")
            .args(["debug", "--build-dir"])
            .arg(&self.config.build_dir)
            .current_dir(&self.config.top_dir);
        self.exec(&cmd)
    }

    /// Interactive shell with the toolchain environment exported.
    pub fn terminal(&mut self) -> Result<()> {
        let cmd = if cfg!(windows) {
            ToolCommand::new("cmd").args(["/C", "start", "cmd"])
        } else {
            ToolCommand::new("bash").args(["--rcfile", ".bashrc"])
        };
        // The shell's exit code is whatever the user ran last
        self.host.status(&cmd.current_dir(&self.config.top_dir))?;
        Ok(())
    }

    pub fn select(&mut self) -> Result<()> {
        self.vscode()?;
        println!(
            "\n=== \"{}\" is now the selected example for builds ===\n",
            self.config.example
        );
        Ok(())
    }

    pub(crate) fn build_ninja(&self) -> PathBuf {
        self.config.build_dir.join("build.ninja")
    }
}

fn nrfjprog() -> ToolCommand {
    ToolCommand::new("nrfjprog").args(["-f", "nrf53"])
}

/// Whether `path` was modified after `since`. A missing file counts as not
/// modified. Timestamp granularity makes this best effort.
fn modified_since(path: &Path, since: SystemTime) -> bool {
    match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => modified > since,
        Err(e) => {
            log::warn!("Can't stat {}: {}", path.display(), e);
            false
        }
    }
}

/// `H:MM:SS`, rounded to the second.
fn format_elapsed(elapsed: Duration) -> String {
    let secs = (elapsed.as_millis() + 500) / 1000;
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
