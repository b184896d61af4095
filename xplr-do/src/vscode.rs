// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! VS Code integration: generated configuration files and launching the IDE.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use xplr_common::ide::{self, CppPropertiesParams, LaunchParams, TasksParams};
use xplr_common::{CompileFlags, Core, ImageFormat, ImageSpec};

use crate::commands::Session;
use crate::host::{Host, ToolCommand};

const GCC: &str = "arm-zephyr-eabi-gcc";
const GDB: &str = "arm-zephyr-eabi-gdb";

#[cfg(windows)]
const CODE: &str = "code.cmd";
#[cfg(not(windows))]
const CODE: &str = "code";

impl<H: Host> Session<H> {
    /// Render the three VS Code files into `<cwd>/.vscode`.
    pub fn vscode_files(&mut self) -> Result<()> {
        let path_var = std::env::var_os("PATH");
        let gcc = find_in_path(GCC, path_var.clone())
            .with_context(|| format!("{} not found in PATH", GCC))?;
        let gdb = find_in_path(GDB, path_var)
            .with_context(|| format!("{} not found in PATH", GDB))?;
        let toolchain_dir = gcc.parent().map(Path::to_path_buf).unwrap_or_default();

        let templates = self.config.top_dir.join(ide::VSCODE_DIR);
        let out_dir = self.config.cwd.join(ide::VSCODE_DIR);
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;

        // Tasks
        let tasks = ide::render_tasks(
            &read_template(&templates, ide::TASKS_TEMPLATE)?,
            &TasksParams {
                do_command: &ide::do_command(&self.config.top_dir),
                examples: &self.config.examples,
                default_example: &self.config.example,
            },
        );
        write_output(&out_dir, ide::TASKS_FILE, &tasks)?;

        // Launch
        let exe = ImageSpec::new(Core::App, ImageFormat::Hex, self.config.use_bootloader)
            .path(&self.config.build_dir);
        let exe_file = exe
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let launch = ide::render_launch(
            &read_template(&templates, ide::LAUNCH_TEMPLATE)?,
            &LaunchParams {
                build_dir: &self.config.build_dir,
                exe_file: &exe_file,
                toolchain_dir: &toolchain_dir,
                gdb_path: &gdb,
            },
        );
        write_output(&out_dir, ide::LAUNCH_FILE, &launch)?;

        // C/C++, defines and includes come from the generated ninja file
        let ninja = self.build_ninja();
        if !ninja.exists() {
            // Never built, needs a first build
            self.build()?;
        }
        if !ninja.exists() {
            bail!("File not found: {}", ninja.display());
        }
        let flags = CompileFlags::from_file(&ninja)?;
        log::debug!(
            "{} defines, {} include dirs from {}",
            flags.defines.len(),
            flags.includes.len(),
            ninja.display()
        );
        let compiler = find_compiler(&toolchain_dir)?;
        let properties = ide::render_cpp_properties(
            &read_template(&templates, ide::CPP_PROPERTIES_TEMPLATE)?,
            &CppPropertiesParams {
                compiler_path: &compiler,
                flags: &flags,
            },
        );
        write_output(&out_dir, ide::CPP_PROPERTIES_FILE, &properties)
    }

    /// Build, refresh the VS Code files and open the editor.
    pub fn vscode(&mut self) -> Result<()> {
        self.build()?;
        self.vscode_files()?;

        let cmd = match find_workspace(&self.config.cwd)? {
            Some(workspace) => {
                println!(
                    "Using workspace: {}",
                    workspace
                        .file_name()
                        .unwrap_or(workspace.as_os_str())
                        .to_string_lossy()
                );
                ToolCommand::new(CODE).arg(workspace)
            }
            None => ToolCommand::new(CODE)
                .args([".", "-g"])
                .arg(self.config.example_dir().join("src").join("main.c")),
        };
        self.exec(&cmd.current_dir(&self.config.cwd))
    }
}

fn read_template(dir: &Path, name: &str) -> Result<String> {
    let path = dir.join(name);
    fs::read_to_string(&path).with_context(|| format!("Failed to read template {}", path.display()))
}

fn write_output(dir: &Path, name: &str, contents: &str) -> Result<()> {
    let path = dir.join(name);
    log::info!("Writing {}", path.display());
    fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

/// Locate `program` in the directories of a `PATH`-style variable.
pub fn find_in_path(program: &str, path_var: Option<OsString>) -> Option<PathBuf> {
    let file_name = format!("{}{}", program, std::env::consts::EXE_SUFFIX);
    std::env::split_paths(&path_var?)
        .map(|dir| dir.join(&file_name))
        .find(|candidate| candidate.is_file())
}

/// First `*gcc` executable below the toolchain directory, in path order.
fn find_compiler(toolchain_dir: &Path) -> Result<PathBuf> {
    let suffix = format!("gcc{}", std::env::consts::EXE_SUFFIX);
    let mut found = Vec::new();
    collect_files(toolchain_dir, &suffix, &mut found)?;
    found.sort();
    match found.into_iter().next() {
        Some(compiler) => Ok(compiler),
        None => bail!("No compiler found in {}", toolchain_dir.display()),
    }
}

fn collect_files(dir: &Path, suffix: &str, found: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, suffix, found)?;
        } else if path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().ends_with(suffix))
        {
            found.push(path);
        }
    }
    Ok(())
}

/// First `*.code-workspace` file in `dir`, by name.
fn find_workspace(dir: &Path) -> Result<Option<PathBuf>> {
    let entries = fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
    let mut workspaces = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "code-workspace") {
            workspaces.push(path);
        }
    }
    workspaces.sort();
    Ok(workspaces.into_iter().next())
}
