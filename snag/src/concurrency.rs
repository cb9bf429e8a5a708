// SPDX-FileCopyrightText: 2026 The snag Authors
//
// SPDX-License-Identifier: MIT

//! The two scheduling models described in the concurrency model: a
//! `rayon::Scope` per top-level invocation in parallel mode, or plain
//! sequential execution on the calling thread in verbose mode.
//!
//! `rayon::Scope::spawn` plays the role an error-group's `Go` would play in
//! a goroutine-based design; the scope's implicit join at the end plays the
//! role of `Wait`.

use std::sync::Mutex;

use crate::error::SnagError;

/// One unit of schedulable work: a placement, or a whole per-file snag
/// invocation when walking a directory. Borrows rather than requiring
/// `'static` so a batch of jobs can close over shared state (the
/// destination coordinator) that outlives only the call to `run_all`.
pub type Job<'a> = Box<dyn FnOnce() -> Result<(), SnagError> + Send + 'a>;

/// Run every job in `jobs`, either concurrently (`parallel`) or one at a
/// time in submission order. Returns every error encountered; an empty
/// vector means every job succeeded.
pub fn run_all<'a>(parallel: bool, jobs: Vec<Job<'a>>) -> Vec<SnagError> {
    if parallel {
        let errors: Mutex<Vec<SnagError>> = Mutex::new(Vec::new());
        rayon::scope(|scope| {
            for job in jobs {
                let errors = &errors;
                scope.spawn(move |_| {
                    if let Err(err) = job() {
                        errors
                            .lock()
                            .unwrap_or_else(|poison| poison.into_inner())
                            .push(err);
                    }
                });
            }
        });
        errors.into_inner().unwrap_or_else(|poison| poison.into_inner())
    } else {
        jobs.into_iter().filter_map(|job| job().err()).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::InvocationError;

    #[test]
    fn sequential_runs_in_submission_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let jobs: Vec<Job<'static>> = (0..5)
            .map(|i| {
                let order = Arc::clone(&order);
                Box::new(move || {
                    order.lock().unwrap().push(i);
                    Ok(())
                }) as Job<'static>
            })
            .collect();
        run_all(false, jobs);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn parallel_collects_every_error() {
        let jobs: Vec<Job<'static>> = vec![
            Box::new(|| Ok(())),
            Box::new(|| Err(InvocationError::WrongArgCount(3).into())),
            Box::new(|| Err(InvocationError::CopyInPlace.into())),
        ];
        let errors = run_all(true, jobs);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn sequential_collects_every_error() {
        let jobs: Vec<Job<'static>> = vec![
            Box::new(|| Err(InvocationError::WrongArgCount(1).into())),
            Box::new(|| Ok(())),
        ];
        let errors = run_all(false, jobs);
        assert_eq!(errors.len(), 1);
    }
}
