// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive abort support.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// A handle used to request that a run stop early.
///
/// Cloned handles share the same flag. The runner polls it between invocations and between the
/// parameter sets of a parameterized test; an invocation that has already started always
/// completes, through teardown, before the stop takes effect.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
}

impl StopHandle {
    /// Creates a new handle with no stop requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the run stop.
    pub fn request_stop(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Returns true if a stop was requested.
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}
