// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Tests for VS Code template rendering, using the shipped templates.

use std::path::Path;

use xplr_common::ide::{
    do_command, render_cpp_properties, render_launch, render_tasks, to_posix, CppPropertiesParams,
    LaunchParams, TasksParams,
};
use xplr_common::CompileFlags;

const TASKS: &str = include_str!("../templates/tasks_tmpl.json");
const LAUNCH: &str = include_str!("../templates/launch_tmpl.json");
const CPP: &str = include_str!("../templates/c_cpp_properties_tmpl.json");

#[test]
fn test_tasks_template() {
    let examples = vec!["blink".to_string(), "cell_scan".to_string()];
    let rendered = render_tasks(
        TASKS,
        &TasksParams {
            do_command: "\\\"/xplr/do\\\"",
            examples: &examples,
            default_example: "cell_scan",
        },
    );

    assert!(rendered.contains(r#""command": "\"/xplr/do\" build -e ${input:example}""#));
    assert!(rendered.contains(r#""options": ["blink", "cell_scan"]"#));
    assert!(rendered.contains(r#""default": "cell_scan""#));
    assert!(!rendered.contains("$DO"));
    assert!(!rendered.contains("$EXAMPLES"));
    assert!(!rendered.contains("$DEF_EX"));
}

#[test]
fn test_launch_template() {
    let rendered = render_launch(
        LAUNCH,
        &LaunchParams {
            build_dir: Path::new("/xplr/_build/blink"),
            exe_file: "zephyr_signed.hex",
            toolchain_dir: Path::new("/opt/zephyr-sdk/arm-zephyr-eabi/bin"),
            gdb_path: Path::new("/opt/zephyr-sdk/arm-zephyr-eabi/bin/arm-zephyr-eabi-gdb"),
        },
    );

    assert!(rendered.contains(r#""loadFiles": ["/xplr/_build/blink/zephyr/zephyr_signed.hex"]"#));
    assert!(rendered.contains(r#""armToolchainPath": "/opt/zephyr-sdk/arm-zephyr-eabi/bin""#));
    assert!(rendered.contains("arm-zephyr-eabi-gdb\""));
    for placeholder in ["$BUILD_DIR", "$EXE_FILE", "$TC_DIR", "$GDB_PATH"] {
        assert!(!rendered.contains(placeholder), "{} left in output", placeholder);
    }
}

#[test]
fn test_cpp_properties_template_is_valid_json() {
    let flags = CompileFlags {
        defines: vec!["KERNEL".to_string(), "__ZEPHYR__=1".to_string()],
        includes: vec!["/ncs/zephyr/include".to_string()],
    };
    let rendered = render_cpp_properties(
        CPP,
        &CppPropertiesParams {
            compiler_path: Path::new("/opt/sdk/bin/arm-zephyr-eabi-gcc"),
            flags: &flags,
        },
    );

    let json: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    let config = &json["configurations"][0];
    assert_eq!(config["compilerPath"], "/opt/sdk/bin/arm-zephyr-eabi-gcc");
    assert_eq!(config["defines"][1], "__ZEPHYR__=1");
    assert_eq!(config["includePath"][0], "/ncs/zephyr/include");
}

#[test]
fn test_windows_paths_become_posix() {
    assert_eq!(
        to_posix(Path::new(r"C:\ncs\toolchain\bin")),
        "C:/ncs/toolchain/bin"
    );
}

#[test]
fn test_do_command_is_quoted() {
    let command = do_command(Path::new("/xplr"));
    assert!(command.starts_with("\\\"/xplr/do"));
    assert!(command.ends_with("\\\""));
}
