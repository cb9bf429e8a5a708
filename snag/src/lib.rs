// SPDX-FileCopyrightText: 2026 The snag Authors
//
// SPDX-License-Identifier: MIT

//! Snags a binary (or library) and its dynamic-linker dependencies into a
//! minimal `DEST/bin` + `DEST/lib64` runtime tree.
//!
//! The library exposes a single entry point, [`snag`]; everything else is
//! implementation detail reachable through these modules for testing and
//! for the CLI shell in `src/main.rs`.

pub mod coordinator;
pub mod concurrency;
pub mod elf;
pub mod error;
pub mod loader;
pub mod materialize;
pub mod options;
pub mod pathutils;
pub mod pipeline;
pub mod walk;

use std::path::Path;

use log::debug;

use coordinator::Coordinator;
use error::{InvocationError, SnagError};
pub use options::SnagOptions;

/// Snag `source` (a file or a directory) into `destination`.
///
/// Invocation errors (`--recursive` on a non-directory, `copy_directory`
/// combined with `in_place`) are detected before any filesystem side
/// effect and short-circuit immediately.
pub fn snag(source: &Path, destination: &Path, options: SnagOptions) -> Result<(), SnagError> {
    if options.copy_directory && options.in_place {
        return Err(InvocationError::CopyInPlace.into());
    }
    if options.recursive && !source.is_dir() {
        return Err(InvocationError::RecursiveOnFile(source.to_path_buf()).into());
    }

    let coordinator = Coordinator::new();

    if source.is_dir() {
        snag_directory(source, destination, options, &coordinator)
    } else {
        pipeline::snag_file(source, destination, options, &coordinator)
    }
}

fn snag_directory(
    source: &Path,
    destination: &Path,
    options: SnagOptions,
    coordinator: &Coordinator,
) -> Result<(), SnagError> {
    let files = walk::walk(source, options.recursive).map_err(|io_err| SnagError::Filesystem {
        path: source.to_path_buf(),
        source: io_err,
    })?;
    debug!("walking {}: {} files", source.display(), files.len());

    let jobs: Vec<concurrency::Job<'_>> = files
        .into_iter()
        .map(|file| -> concurrency::Job<'_> {
            Box::new(move || pipeline::snag_file(&file, destination, options, coordinator))
        })
        .collect();

    let errors = concurrency::run_all(!options.verbose, jobs);
    match error::first_of(errors) {
        None => Ok(()),
        Some((cause, also)) => Err(SnagError::Snaggle {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            cause: Box::new(cause),
            also,
        }),
    }
}

#[cfg(test)]
mod tests {
    use fs_err as fs;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn recursive_on_a_file_is_an_invocation_error() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("not_a_dir");
        fs::write(&file, b"payload").unwrap();

        let err = snag(
            &file,
            dir.path(),
            SnagOptions {
                recursive: true,
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SnagError::Invocation(InvocationError::RecursiveOnFile(_))
        ));
    }

    #[test]
    fn copy_and_in_place_together_is_an_invocation_error() {
        let dir = tempdir().unwrap();
        let err = snag(
            dir.path(),
            dir.path(),
            SnagOptions {
                copy_directory: true,
                in_place: true,
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SnagError::Invocation(InvocationError::CopyInPlace)
        ));
    }

    #[test]
    fn non_elf_file_without_copy_directory_is_a_snaggle_error() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("readme.txt");
        fs::write(&src, b"not an elf file").unwrap();
        let dest = dir.path().join("out");

        let err = snag(&src, &dest, SnagOptions::default()).unwrap_err();
        assert!(err.is_invalid_elf());
    }

    #[test]
    fn copy_directory_preserves_a_non_elf_file_under_its_absolute_path() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("readme.txt");
        fs::write(&src, b"not an elf file").unwrap();
        let dest = dir.path().join("out");

        snag(
            &src,
            &dest,
            SnagOptions {
                copy_directory: true,
                ..Default::default()
            },
        )
        .unwrap();

        let src_abs = fs::canonicalize(&src).unwrap();
        let relative = src_abs.strip_prefix("/").unwrap();
        assert!(dest.join(relative).exists());
    }

    #[test]
    fn copy_directory_places_a_symlinked_file_under_the_symlinks_own_path() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("elsewhere")).unwrap();
        let real = dir.path().join("elsewhere/readme.txt");
        fs::write(&real, b"not an elf file").unwrap();
        fs::create_dir(dir.path().join("here")).unwrap();
        let link = dir.path().join("here/readme.txt");
        symlink(&real, &link).unwrap();
        let dest = dir.path().join("out");

        snag(
            &link,
            &dest,
            SnagOptions {
                copy_directory: true,
                ..Default::default()
            },
        )
        .unwrap();

        let link_relative = link.strip_prefix("/").unwrap_or(&link);
        assert!(dest.join(link_relative).exists());
        let real_relative = real.strip_prefix("/").unwrap_or(&real);
        assert!(!dest.join(real_relative).exists());
    }
}
