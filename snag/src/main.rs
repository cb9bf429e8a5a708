// SPDX-FileCopyrightText: 2026 The snag Authors
//
// SPDX-License-Identifier: MIT

//! Thin CLI shell: parses argv into a `SnagOptions` value, calls straight
//! into `snag::snag`, and translates the result into an exit code and a
//! single-line diagnostic. No pipeline logic lives here.

mod cli;

use std::process::ExitCode;

use cli::{Cli, USAGE};
use snag::error::SnagError;

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("Sorry someone panicked!");
        eprintln!("This is what we know ...");
        eprintln!("{info}");
        eprintln!("{}", std::backtrace::Backtrace::capture());
    }));
}

fn run() -> ExitCode {
    let cli = match Cli::parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("Error: {err}\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match snag::snag(&cli.source, &cli.destination, cli.options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(SnagError::Invocation(inv)) => {
            eprintln!("Error: {inv}\n{USAGE}");
            ExitCode::from(2)
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(1)
        }
    }
}

fn main() -> ExitCode {
    install_panic_hook();
    env_logger::init();

    // `catch_unwind` so a panic exits with the spec's mandated code 3
    // instead of the Rust runtime's default 101.
    match std::panic::catch_unwind(run) {
        Ok(code) => code,
        Err(_) => ExitCode::from(3),
    }
}
