// SPDX-FileCopyrightText: 2026 The snag Authors
//
// SPDX-License-Identifier: MIT

//! The snag pipeline: turns one source path into a set of scheduled
//! placements (primary, interpreter, dependencies) and drives them through
//! the materializer, wrapping any failure into a single snaggle error.

use std::path::{Path, PathBuf};

use log::debug;

use crate::concurrency::{run_all, Job};
use crate::coordinator::Coordinator;
use crate::elf;
use crate::error::{self, SnagError};
use crate::materialize;
use crate::options::SnagOptions;
use crate::pathutils;

/// Snag one source file (or, in copy-directory mode, any file at all) into
/// `destination` per `options`.
pub fn snag_file(
    source: &Path,
    destination: &Path,
    options: SnagOptions,
    coordinator: &Coordinator,
) -> Result<(), SnagError> {
    let binary = match elf::parse(source) {
        Ok(binary) => binary,
        Err(partial) => {
            return if options.copy_directory {
                let target_dir = match preserved_dir_for_source(destination, source) {
                    Ok(dir) => dir,
                    Err(cause) => return Err(wrap(source, destination, cause, Vec::new())),
                };
                materialize::materialize(source, &target_dir, coordinator, options.verbose)
                    .map(|_| ())
                    .map_err(|cause| wrap(source, destination, cause, Vec::new()))
            } else {
                Err(wrap(
                    source,
                    destination,
                    SnagError::Elf {
                        path: partial.partial.path,
                        source: partial.source,
                    },
                    Vec::new(),
                ))
            };
        }
    };

    debug!(
        "{}: kind={:?} class={:?} interpreter={:?} deps={}",
        binary.path.display(),
        binary.kind,
        binary.class,
        binary.interpreter,
        binary.dependencies.len()
    );

    let lib_dir = destination.join("lib64");
    let mut placements: Vec<(PathBuf, PathBuf)> = Vec::new();

    if !options.in_place {
        let primary_dir = if options.copy_directory {
            match preserved_dir_for_source(destination, source) {
                Ok(dir) => dir,
                Err(cause) => return Err(wrap(source, destination, cause, Vec::new())),
            }
        } else if binary.kind.is_executable() {
            destination.join("bin")
        } else {
            lib_dir.clone()
        };
        placements.push((source.to_path_buf(), primary_dir));
    }

    if let Some(interpreter) = &binary.interpreter {
        placements.push((interpreter.clone(), lib_dir.clone()));
    }

    for dep in &binary.dependencies {
        placements.push((dep.clone(), lib_dir.clone()));
    }

    let jobs: Vec<Job<'_>> = placements
        .into_iter()
        .map(|(placement_source, target_dir)| -> Job<'_> {
            let verbose = options.verbose;
            Box::new(move || {
                materialize::materialize(&placement_source, &target_dir, coordinator, verbose)
                    .map(|_| ())
            })
        })
        .collect();

    let errors = run_all(!options.verbose, jobs);
    match error::first_of(errors) {
        None => Ok(()),
        Some((cause, also)) => Err(wrap(source, destination, cause, also)),
    }
}

/// `DEST/<absolute-source-path>`'s parent directory for `source`, used by
/// copy-directory mode to preserve the original tree shape under the
/// destination. `source` is made absolute but, unlike the parsed binary's
/// own `path` field, not symlink-resolved: a symlinked input is placed
/// under the directory naming *it*, not the directory of whatever it
/// points to.
fn preserved_dir_for_source(destination: &Path, source: &Path) -> Result<PathBuf, SnagError> {
    let absolute = pathutils::absolute(source).map_err(|io_err| SnagError::Filesystem {
        path: source.to_path_buf(),
        source: io_err,
    })?;
    Ok(preserved_path_dir(destination, &absolute))
}

/// `DEST/<absolute_source>`'s parent directory.
fn preserved_path_dir(destination: &Path, absolute_source: &Path) -> PathBuf {
    let relative = absolute_source
        .strip_prefix("/")
        .unwrap_or(absolute_source)
        .parent()
        .unwrap_or_else(|| Path::new(""));
    destination.join(relative)
}

fn wrap(source: &Path, destination: &Path, cause: SnagError, also: Vec<SnagError>) -> SnagError {
    SnagError::Snaggle {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        cause: Box::new(cause),
        also,
    }
}
