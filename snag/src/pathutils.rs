// SPDX-FileCopyrightText: 2026 The snag Authors
//
// SPDX-License-Identifier: MIT

//! Absolute-path canonicalization and the filename-only comparator used to
//! reconcile library paths across distributions.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Resolve `path` to an absolute, fully symlink-resolved path.
pub fn canonicalize(path: impl AsRef<Path>) -> std::io::Result<PathBuf> {
    fs_err::canonicalize(path.as_ref()).map_err(Into::into)
}

/// Make `path` absolute (joined onto the current directory if relative,
/// lexically normalized) without resolving symlinks in any component.
///
/// Unlike [`canonicalize`], a symlink given as `path` stays a symlink: this
/// is what copy-directory mode needs to preserve the destination tree under
/// the name the caller actually gave, rather than the symlink's target.
pub fn absolute(path: impl AsRef<Path>) -> std::io::Result<PathBuf> {
    std::path::absolute(path.as_ref())
}

/// Compare two library paths. If both are absolute, only the final path
/// component is compared; otherwise the whole path is compared byte-wise.
///
/// Distributions place the same library at different absolute paths
/// (`/lib64/...` vs. `/usr/lib64/...` vs. `/lib/x86_64-linux-gnu/...`); the
/// filename is the identity that matters.
pub fn libpath_cmp(a: &Path, b: &Path) -> Ordering {
    if a.is_absolute() && b.is_absolute() {
        a.file_name().cmp(&b.file_name())
    } else {
        a.cmp(b)
    }
}

/// `true` if `a` and `b` name the same library per [`libpath_cmp`].
pub fn libpath_eq(a: &Path, b: &Path) -> bool {
    libpath_cmp(a, b) == Ordering::Equal
}

/// Sort `paths` using [`libpath_cmp`] and drop duplicates by filename.
pub fn sort_and_dedup_by_filename(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.sort_by(|a, b| libpath_cmp(a, b));
    paths.dedup_by(|a, b| libpath_eq(a, b));
    paths
}

#[cfg(test)]
mod tests {
    use std::os::unix::fs::symlink;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn absolute_does_not_resolve_a_symlink() {
        let dir = tempdir().unwrap();
        let real = dir.path().join("real");
        std::fs::write(&real, b"").unwrap();
        let link = dir.path().join("link");
        symlink(&real, &link).unwrap();

        let resolved = absolute(&link).unwrap();
        assert_eq!(resolved, link);
        assert_ne!(resolved, canonicalize(&link).unwrap());
    }

    #[test]
    fn filename_only_when_both_absolute() {
        let fedora = Path::new("/lib64/libc.so.6");
        let ubuntu = Path::new("/lib64/x86_64-linux-gnu/libc.so.6");
        assert_eq!(libpath_cmp(fedora, ubuntu), Ordering::Equal);
    }

    #[test]
    fn full_path_when_relative() {
        let a = Path::new("libc.so.6");
        let b = Path::new("other/libc.so.6");
        assert_ne!(libpath_cmp(a, b), Ordering::Equal);
    }

    #[test]
    fn sorts_by_filename() {
        let unsorted = vec![
            PathBuf::from("/lib64/libpcre2-8.so.0"),
            PathBuf::from("/lib64/x86_64-linux-gnu/libselinux.so.1"),
            PathBuf::from("/lib64/x86_64-linux-gnu/libc.so.6"),
        ];
        let sorted = sort_and_dedup_by_filename(unsorted);
        let names: Vec<_> = sorted
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["libc.so.6", "libpcre2-8.so.0", "libselinux.so.1"]);
    }

    #[test]
    fn dedups_by_filename() {
        let dupes = vec![
            PathBuf::from("/lib64/libc.so.6"),
            PathBuf::from("/usr/lib64/libc.so.6"),
        ];
        let deduped = sort_and_dedup_by_filename(dupes);
        assert_eq!(deduped.len(), 1);
    }
}
