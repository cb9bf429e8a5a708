// SPDX-FileCopyrightText: 2026 The snag Authors
//
// SPDX-License-Identifier: MIT

//! The `SnagOptions` value the CLI shell builds and the library consumes.

/// Tunables for one [`crate::snag`] invocation. There is no configuration
/// file; every field maps directly onto a CLI flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnagOptions {
    /// Skip placement of the primary file; still materialize its
    /// interpreter and dependencies under the destination.
    pub in_place: bool,
    /// Place the primary (and, when walking a directory, every file) under
    /// `DEST/<absolute-source-path>` instead of the `bin`/`lib64` split.
    /// Mutually exclusive with `in_place`.
    pub copy_directory: bool,
    /// Only meaningful when the source is a directory: include
    /// subdirectories.
    pub recursive: bool,
    /// Run placements sequentially, in schedule order, and print a log
    /// line per placement to standard output.
    pub verbose: bool,
}
