// SPDX-FileCopyrightText: 2026 The snag Authors
//
// SPDX-License-Identifier: MIT

//! Manual long/short option parsing for the `snag` binary, in the style of
//! a hand-dispatched `lexopt::Parser` loop (no derive macro): translate CLI
//! arguments into a [`snag::SnagOptions`] value plus the positional source
//! and destination, or a usage/invocation failure.

use std::path::PathBuf;

use thiserror::Error;

use snag::error::InvocationError;
use snag::SnagOptions;

pub const USAGE: &str = "\
Usage: snag [--in-place] FILE DEST
       snag [--copy | --in-place] [--recursive] DIR DEST

Snag a copy of FILE (or every file under DIR) and all its dynamic-linker
dependencies under DEST/bin & DEST/lib64.

Hardlinks are created where possible; when that isn't possible (FILE and
DEST on different filesystems, or a hardened kernel's protected hardlinks)
a content copy is made instead, preserving file mode and attempting to
preserve ownership.

Options:
      --copy          Preserve DIR's structure under DEST instead of the bin/lib64 split
      --in-place       Skip placing the primary file; place only its dependencies
  -r, --recursive      Recurse into subdirectories of DIR
  -v, --verbose        Run sequentially and print a line per placement
  -h, --help           Print this message
      --version        Print the version and exit
";

/// Everything that can go wrong while parsing argv, before any library call.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Lexopt(#[from] lexopt::Error),

    #[error(transparent)]
    Invocation(#[from] InvocationError),
}

pub struct Cli {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub options: SnagOptions,
}

impl Cli {
    pub fn parse() -> Result<Self, CliError> {
        use lexopt::prelude::*;

        let mut options = SnagOptions::default();
        let mut positional = Vec::new();

        let mut parser = lexopt::Parser::from_env();
        while let Some(arg) = parser.next()? {
            match arg {
                Long("copy") => options.copy_directory = true,
                Long("in-place") => options.in_place = true,
                Short('r') | Long("recursive") => options.recursive = true,
                Short('v') | Long("verbose") => options.verbose = true,
                Short('h') | Long("help") => {
                    print!("{USAGE}");
                    std::process::exit(0);
                }
                Long("version") => {
                    println!("{}", env!("CARGO_PKG_VERSION"));
                    std::process::exit(0);
                }
                Value(value) => positional.push(PathBuf::from(value)),
                arg => return Err(arg.unexpected().into()),
            }
        }

        if positional.len() != 2 {
            return Err(InvocationError::WrongArgCount(positional.len()).into());
        }
        let destination = positional.pop().unwrap();
        let source = positional.pop().unwrap();

        if options.copy_directory && options.in_place {
            return Err(InvocationError::CopyInPlace.into());
        }
        if options.recursive && !source.is_dir() {
            return Err(InvocationError::RecursiveOnFile(source).into());
        }

        Ok(Self {
            source,
            destination,
            options,
        })
    }
}
