// SPDX-FileCopyrightText: 2026 The snag Authors
//
// SPDX-License-Identifier: MIT

//! The error taxonomy described by the pipeline's design: a small tagged
//! enum per component, composed into [`SnagError`] at the boundary the
//! library exposes to callers.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// A malformed or unsupported ELF file. Always a specialization of
/// "invalid ELF" in the sense used by the rest of the pipeline.
#[derive(Debug, Error)]
pub enum ElfError {
    #[error("no data at byte 0")]
    Empty,

    #[error("bad magic number {0:x?} in record at byte 0x0")]
    BadMagic([u8; 4]),

    #[error("bad interpreter entry")]
    BadInterpreter,

    #[error("unsupported ELF object type {0}")]
    UnsupportedType(u16),

    #[error(transparent)]
    Malformed(#[from] goblin::error::Error),
}

/// Failure enumerating a binary's dependencies via the platform loader.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("interpreter {0} is not a supported 64-bit ld-linux loader")]
    UnsupportedInterpreter(PathBuf),

    #[error("failed to run loader {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("loader {path} exited with {status}: {stderr}")]
    Failed {
        path: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    #[error("loader output was not valid UTF-8: {0}")]
    InvalidOutput(#[from] std::string::FromUtf8Error),
}

/// Everything that can go wrong while turning a path into a [`crate::elf::Binary`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid ELF file: {0}")]
    Elf(#[from] ElfError),

    #[error(transparent)]
    Loader(#[from] LoaderError),
}

/// Semantic misuse of the CLI/library surface, detected before any
/// filesystem side effect takes place.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("--recursive {0}: not a directory")]
    RecursiveOnFile(PathBuf),

    #[error("cannot copy in-place")]
    CopyInPlace,

    #[error("snag expects 2 argument(s), {0} received")]
    WrongArgCount(usize),
}

/// The top-level error returned by [`crate::snag`].
#[derive(Debug, Error)]
pub enum SnagError {
    #[error("parsing {path}:\n{source}")]
    Elf {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("{path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "failed to set ownership of {target} to match {source_path} \
        (src: {src_uid}:{src_gid}, dst: {dst_uid}:{dst_gid}): {cause}"
    )]
    Ownership {
        source_path: PathBuf,
        target: PathBuf,
        src_uid: u32,
        src_gid: u32,
        dst_uid: u32,
        dst_gid: u32,
        #[source]
        cause: nix::errno::Errno,
    },

    #[error("{target} already exists and differs from {source_path}")]
    LinkExistsDiffers { source_path: PathBuf, target: PathBuf },

    #[error("snagging {source} to {destination}: {cause}")]
    Snaggle {
        source: PathBuf,
        destination: PathBuf,
        #[source]
        cause: Box<SnagError>,
        also: Vec<SnagError>,
    },

    #[error(transparent)]
    Invocation(#[from] InvocationError),
}

impl SnagError {
    /// True for every variant that stems from the input not being a usable
    /// ELF file (as opposed to a filesystem/loader/usage problem).
    pub fn is_invalid_elf(&self) -> bool {
        match self {
            SnagError::Elf { source, .. } => matches!(source, ParseError::Elf(_)),
            SnagError::Snaggle { cause, .. } => cause.is_invalid_elf(),
            _ => false,
        }
    }

    /// True for a usage/invocation error, as opposed to a failure that
    /// occurred while doing real work.
    pub fn is_invocation(&self) -> bool {
        matches!(self, SnagError::Invocation(_))
    }

    /// Additional errors that occurred alongside the primary (reported)
    /// one, if this is a [`SnagError::Snaggle`] wrapping more than one
    /// placement failure.
    pub fn also_errors(&self) -> &[SnagError] {
        match self {
            SnagError::Snaggle { also, .. } => also,
            _ => &[],
        }
    }
}

/// Join a batch of fallible placements into a single result: the first
/// error is reported directly, the rest remain reachable via
/// [`SnagError::also_errors`].
pub fn first_of(mut errors: Vec<SnagError>) -> Option<(SnagError, Vec<SnagError>)> {
    if errors.is_empty() {
        None
    } else {
        let first = errors.remove(0);
        Some((first, errors))
    }
}
