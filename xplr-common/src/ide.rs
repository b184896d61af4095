// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! VS Code integration files rendered from templates.
//!
//! Templates are plain JSON text with `$NAME` placeholders. Rendering is a
//! straight text substitution; the caller is responsible for reading the
//! templates and writing the results.

use std::path::Path;

use crate::ninja::CompileFlags;

pub const TASKS_TEMPLATE: &str = "tasks_tmpl.json";
pub const LAUNCH_TEMPLATE: &str = "launch_tmpl.json";
pub const CPP_PROPERTIES_TEMPLATE: &str = "c_cpp_properties_tmpl.json";

pub const TASKS_FILE: &str = "tasks.json";
pub const LAUNCH_FILE: &str = "launch.json";
pub const CPP_PROPERTIES_FILE: &str = "c_cpp_properties.json";

/// Directory holding both the templates (under the top dir) and the
/// generated files (under the invoking dir).
pub const VSCODE_DIR: &str = ".vscode";

/// Values substituted into `tasks_tmpl.json`.
pub struct TasksParams<'a> {
    /// Quoted wrapper command, see [`do_command`].
    pub do_command: &'a str,
    pub examples: &'a [String],
    pub default_example: &'a str,
}

/// Values substituted into `launch_tmpl.json`.
pub struct LaunchParams<'a> {
    pub build_dir: &'a Path,
    /// File name only, the template joins it with the build dir.
    pub exe_file: &'a str,
    pub toolchain_dir: &'a Path,
    pub gdb_path: &'a Path,
}

/// Values substituted into `c_cpp_properties_tmpl.json`.
pub struct CppPropertiesParams<'a> {
    pub compiler_path: &'a Path,
    pub flags: &'a CompileFlags,
}

pub fn render_tasks(template: &str, params: &TasksParams<'_>) -> String {
    template
        .replace("$DO", params.do_command)
        .replace("$EXAMPLES", &example_list(params.examples))
        .replace("$DEF_EX", params.default_example)
}

pub fn render_launch(template: &str, params: &LaunchParams<'_>) -> String {
    template
        .replace("$BUILD_DIR", &to_posix(params.build_dir))
        .replace("$EXE_FILE", params.exe_file)
        .replace("$TC_DIR", &to_posix(params.toolchain_dir))
        .replace("$GDB_PATH", &to_posix(params.gdb_path))
}

pub fn render_cpp_properties(template: &str, params: &CppPropertiesParams<'_>) -> String {
    template
        .replace("$COMP_EXE", &to_posix(params.compiler_path))
        .replace("$DEFINES", &params.flags.defines_block())
        .replace("$INCLUDES", &params.flags.includes_block())
}

/// Wrapper script path, quoted for embedding inside a JSON string.
pub fn do_command(top_dir: &Path) -> String {
    let script = if cfg!(windows) { "do.bat" } else { "do" };
    format!("\\\"{}/{}\\\"", to_posix(top_dir), script)
}

/// Path rendered with forward slashes, as VS Code expects on every host.
pub fn to_posix(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn example_list(examples: &[String]) -> String {
    let quoted: Vec<String> = examples
        .iter()
        .map(|e| serde_json::Value::from(e.as_str()).to_string())
        .collect();
    format!("[{}]", quoted.join(", "))
}
