// SPDX-FileCopyrightText: 2026 The snag Authors
//
// SPDX-License-Identifier: MIT

//! The destination coordinator: a process-wide claim registry preventing
//! two concurrent materializers from racing on the same target path.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::trace;

/// Tracks every destination path claimed so far in one `snag` invocation.
/// There is no un-claim: once a target is claimed, even a failed
/// materialization leaves it claimed, since a partial write leaves the
/// destination in an indeterminate state that a second writer could only
/// make worse.
#[derive(Default)]
pub struct Coordinator {
    claimed: Mutex<HashSet<PathBuf>>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically insert `target` into the claimed set. Returns `true` if
    /// it was already present.
    pub fn claim(&self, target: &Path) -> bool {
        let mut claimed = self.claimed.lock().unwrap_or_else(|poison| poison.into_inner());
        let already_claimed = !claimed.insert(target.to_path_buf());
        trace!(
            "claim {}: {}",
            target.display(),
            if already_claimed { "already claimed" } else { "new" }
        );
        already_claimed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_claim_succeeds_second_reports_already_claimed() {
        let coordinator = Coordinator::new();
        let target = PathBuf::from("/dest/lib64/libc.so.6");
        assert!(!coordinator.claim(&target));
        assert!(coordinator.claim(&target));
    }

    #[test]
    fn distinct_targets_do_not_interfere() {
        let coordinator = Coordinator::new();
        assert!(!coordinator.claim(Path::new("/dest/lib64/libc.so.6")));
        assert!(!coordinator.claim(Path::new("/dest/lib64/libm.so.6")));
    }
}
