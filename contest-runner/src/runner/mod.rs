// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The test runner.
//!
//! The main structure in this module is [`TestRunner`]. A run brackets the execution plan with
//! global setup and teardown, repeats the plan for the configured loop count, and dispatches each
//! entry either as a single invocation or, for parameterized tests, as one invocation per
//! parameter set.

mod context;
mod executor;
mod imp;
mod outcome;
mod parameterized;
mod run_record;

pub use context::*;
pub use executor::{GLOBAL_SETUP_NAME, GLOBAL_TEARDOWN_NAME};
pub use imp::{TestRunner, TestRunnerBuilder};
pub use outcome::*;
pub use run_record::*;
