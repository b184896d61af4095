// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Process layer for running the external toolchain.
//!
//! Every tool is described by a [`ToolCommand`] (program plus argument
//! vector), never by a shell string. Operations talk to the outside world
//! only through the [`Host`] trait so they can be exercised without the
//! real toolchain.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

/// One external tool invocation.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: OsString,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn get_current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Program file name without directory, for matching and messages.
    pub fn program_name(&self) -> String {
        Path::new(&self.program)
            .file_name()
            .unwrap_or(&self.program)
            .to_string_lossy()
            .into_owned()
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Side effects the operations need from the host system.
pub trait Host {
    /// Run a tool with inherited stdio and wait for it.
    /// Returns whether it exited successfully.
    fn status(&mut self, cmd: &ToolCommand) -> Result<bool>;

    /// Run a tool and capture its stdout. `None` if the tool could not be
    /// started or exited with an error.
    fn output(&mut self, cmd: &ToolCommand) -> Option<String>;

    /// Show `prompt` and block until the user acknowledges it.
    fn confirm(&mut self, prompt: &str) -> Result<()>;
}

/// [`Host`] backed by real processes and the console.
pub struct SystemHost {
    env: Vec<(String, String)>,
}

impl SystemHost {
    /// `env` is exported to every spawned tool.
    pub fn new(env: Vec<(String, String)>) -> Self {
        Self { env }
    }

    fn command(&self, cmd: &ToolCommand) -> Command {
        let mut command = Command::new(&cmd.program);
        command.args(&cmd.args);
        command.envs(self.env.iter().map(|(k, v)| (k, v)));
        if let Some(dir) = &cmd.current_dir {
            command.current_dir(dir);
        }
        command
    }
}

impl Host for SystemHost {
    fn status(&mut self, cmd: &ToolCommand) -> Result<bool> {
        match cmd.get_current_dir() {
            Some(dir) => log::debug!("Running: {} (in {})", cmd, dir.display()),
            None => log::debug!("Running: {}", cmd),
        }
        let status = self
            .command(cmd)
            .status()
            .with_context(|| format!("Failed to run {}", cmd.program_name()))?;
        log::debug!("{} exited with {}", cmd.program_name(), status);
        Ok(status.success())
    }

    fn output(&mut self, cmd: &ToolCommand) -> Option<String> {
        log::debug!("Querying: {}", cmd);
        let output = self
            .command(cmd)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| log::debug!("{} not available: {}", cmd.program_name(), e))
            .ok()?;
        if !output.status.success() {
            log::debug!("{} exited with {}", cmd.program_name(), output.status);
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn confirm(&mut self, prompt: &str) -> Result<()> {
        print!("{}", prompt);
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(())
    }
}

/// Check for a connected J-Link through `nrfjprog --ids`.
///
/// Any failure just means "no probe": flashing then goes through the serial
/// bootloader instead.
pub fn detect_jlink(host: &mut impl Host) -> bool {
    let ids = host.output(&ToolCommand::new("nrfjprog").arg("--ids"));
    let found = ids.is_some_and(|s| !s.trim().is_empty());
    log::info!(
        "J-Link probe {}",
        if found { "detected" } else { "not detected" }
    );
    found
}
