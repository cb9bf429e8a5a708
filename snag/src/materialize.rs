// SPDX-FileCopyrightText: 2026 The snag Authors
//
// SPDX-License-Identifier: MIT

//! The file materializer: places one file under a destination directory by
//! hard-linking it (falling back to a content copy across filesystems or
//! under hardened kernels), idempotently, with a user-visible log line.

use std::fs::Permissions;
use std::io;
use std::os::unix::fs::{MetadataExt, OpenOptionsExt, PermissionsExt};
use std::path::Path;

use fs_err as fs;
use log::{debug, trace};
use nix::unistd::{Gid, Uid};

use crate::coordinator::Coordinator;
use crate::error::SnagError;

/// Which operation a materialization ended up performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Skip,
    Link,
    Copy,
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Operation::Skip => "skip",
            Operation::Link => "link",
            Operation::Copy => "copy",
        }
    }
}

/// Place `source` (as given by the caller, possibly a symlink) under
/// `target_dir`, claiming the destination through `coordinator` first.
/// When `verbose`, print the placement line required by the spec.
pub fn materialize(
    source: &Path,
    target_dir: &Path,
    coordinator: &Coordinator,
    verbose: bool,
) -> Result<Operation, SnagError> {
    fn fs_err(path: &Path) -> impl FnOnce(io::Error) -> SnagError + '_ {
        move |source: io::Error| SnagError::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }

    fs::create_dir_all(target_dir).map_err(fs_err(target_dir))?;
    fs::set_permissions(target_dir, Permissions::from_mode(0o775)).map_err(fs_err(target_dir))?;
    let target_dir = fs::canonicalize(target_dir).map_err(fs_err(target_dir))?;

    let basename = source.file_name().ok_or_else(|| SnagError::Filesystem {
        path: source.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"),
    })?;
    let target = target_dir.join(basename);

    let resolved_source = fs::canonicalize(source).map_err(fs_err(source))?;

    if coordinator.claim(&target) {
        trace!("{} already claimed, skipping", target.display());
        log_placement(Operation::Skip, source, &resolved_source, &target, verbose);
        return Ok(Operation::Skip);
    }

    let op = link_or_copy(&resolved_source, &target)?;
    log_placement(op, source, &resolved_source, &target, verbose);
    Ok(op)
}

fn log_placement(op: Operation, original: &Path, resolved: &Path, target: &Path, verbose: bool) {
    if !verbose {
        return;
    }
    if original == resolved {
        println!("{} {} -> {}", op.as_str(), original.display(), target.display());
    } else {
        println!(
            "{} {} ({}) -> {}",
            op.as_str(),
            original.display(),
            resolved.display(),
            target.display()
        );
    }
}

/// `true` for the cross-filesystem and hardened-kernel-protected-hardlinks
/// errno values that warrant a content-copy fallback rather than a hard
/// failure. Matched on the raw errno (not `io::ErrorKind::CrossesDevices`,
/// stabilized after this crate's MSRV) with `PermissionDenied` as a
/// platform-independent backstop.
fn is_cross_device_or_permission(err: &io::Error) -> bool {
    use nix::errno::Errno;
    matches!(
        err.raw_os_error().map(Errno::from_i32),
        Some(Errno::EXDEV) | Some(Errno::EACCES) | Some(Errno::EPERM)
    ) || err.kind() == io::ErrorKind::PermissionDenied
}

fn link_or_copy(resolved_source: &Path, target: &Path) -> Result<Operation, SnagError> {
    match fs::hard_link(resolved_source, target) {
        Ok(()) => Ok(Operation::Link),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            if same_content(resolved_source, target).map_err(|source| SnagError::Filesystem {
                path: target.to_path_buf(),
                source,
            })? {
                Ok(Operation::Skip)
            } else {
                Err(SnagError::LinkExistsDiffers {
                    source_path: resolved_source.to_path_buf(),
                    target: target.to_path_buf(),
                })
            }
        }
        Err(err) if is_cross_device_or_permission(&err) => {
            debug!(
                "hard link {} -> {} failed ({}), falling back to copy",
                resolved_source.display(),
                target.display(),
                err
            );
            copy_contents(resolved_source, target)?;
            Ok(Operation::Copy)
        }
        Err(err) => Err(SnagError::Filesystem {
            path: target.to_path_buf(),
            source: err,
        }),
    }
}

/// Open `source` read-only, create `target` exclusively with `source`'s
/// mode, copy the byte stream, fsync, and best-effort preserve ownership.
fn copy_contents(source: &Path, target: &Path) -> Result<(), SnagError> {
    fn fs_err(path: &Path) -> impl FnOnce(io::Error) -> SnagError + '_ {
        move |err: io::Error| SnagError::Filesystem {
            path: path.to_path_buf(),
            source: err,
        }
    }

    let mut src_file = fs::File::open(source).map_err(fs_err(source))?;
    let src_meta = src_file.metadata().map_err(fs_err(source))?;

    let mut dst_file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(src_meta.mode())
        .open(target)
        .map_err(fs_err(target))?;

    io::copy(&mut src_file, &mut dst_file).map_err(fs_err(target))?;
    dst_file.sync_all().map_err(fs_err(target))?;

    let src_uid = src_meta.uid();
    let src_gid = src_meta.gid();
    if let Err(cause) = nix::unistd::chown(target, Some(Uid::from_raw(src_uid)), Some(Gid::from_raw(src_gid))) {
        if cause != nix::errno::Errno::EPERM {
            let dst_meta = dst_file.metadata().map_err(fs_err(target))?;
            return Err(SnagError::Ownership {
                source_path: source.to_path_buf(),
                target: target.to_path_buf(),
                src_uid,
                src_gid,
                dst_uid: dst_meta.uid(),
                dst_gid: dst_meta.gid(),
                cause,
            });
        }
        debug!("chown {} denied, keeping mode-preserved copy", target.display());
    }

    drop(src_file);
    drop(dst_file);
    Ok(())
}

/// `true` if `target` already holds the same content as `source`: same
/// inode (trivially identical), or matching mode, size and SHA-256.
fn same_content(source: &Path, target: &Path) -> io::Result<bool> {
    let src_meta = fs::metadata(source)?;
    let dst_meta = fs::metadata(target)?;

    if src_meta.dev() == dst_meta.dev() && src_meta.ino() == dst_meta.ino() {
        return Ok(true);
    }
    if src_meta.mode() != dst_meta.mode() || src_meta.size() != dst_meta.size() {
        return Ok(false);
    }

    Ok(sha256::try_digest(source)? == sha256::try_digest(target)?)
}
