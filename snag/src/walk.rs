// SPDX-FileCopyrightText: 2026 The snag Authors
//
// SPDX-License-Identifier: MIT

//! The directory walker: enumerates the files a directory source should
//! fan out into independent snag-pipeline invocations.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use fs_err as fs;

/// Enumerate the files under `root` that should each become one snag
/// invocation.
///
/// Non-recursive: only immediate entries, subdirectories are skipped
/// entirely (including subdirectories reached through a symlink).
/// Recursive: subdirectories are recursed into, and a symlink is itself
/// resolved to decide whether it names a directory (recurse into it) or a
/// file (yield it, same as an ordinary entry). A canonical-path visited set
/// guards against symlink cycles.
pub fn walk(root: &Path, recursive: bool) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut visited = HashSet::new();
    walk_dir(root, recursive, &mut visited, &mut files)?;
    Ok(files)
}

fn walk_dir(
    dir: &Path,
    recursive: bool,
    visited: &mut HashSet<PathBuf>,
    files: &mut Vec<PathBuf>,
) -> io::Result<()> {
    if let Ok(canonical) = fs::canonicalize(dir) {
        if !visited.insert(canonical) {
            return Ok(());
        }
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_symlink() {
            match fs::metadata(&path) {
                Ok(target_meta) if target_meta.is_dir() => {
                    if recursive {
                        walk_dir(&path, recursive, visited, files)?;
                    }
                }
                _ => files.push(path),
            }
            continue;
        }

        if file_type.is_dir() {
            if recursive {
                walk_dir(&path, recursive, visited, files)?;
            }
            continue;
        }

        files.push(path);
    }

    Ok(())
}
