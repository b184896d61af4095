// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Build, flash and monitor wrapper for the XPLR-IOT-1 examples.
//!
//! Usage:
//!   xplr-do build -e cell_scan
//!   xplr-do flash --when-changed
//!   xplr-do run --uart-name /dev/ttyUSB0
//!   xplr-do select -e ble_nus
//!
//! `NCS_DIR` must point at the nRF Connect SDK.

mod cli;
mod commands;
mod host;
mod monitor;
mod vscode;

use clap::Parser;

fn main() {
    let args = cli::Cli::parse();

    let level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(error) = cli::run(args) {
        println!("*** Error. {:#}", error);
        std::process::exit(1);
    }
}
