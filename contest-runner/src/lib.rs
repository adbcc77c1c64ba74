// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for contest: the test execution engine.
//!
//! The basic flow is: register tests in a [`TestSuite`](list::TestSuite), validate it into a
//! [`TestList`](list::TestList), resolve a [`RunConfig`](config::RunConfig) from a
//! [`ContestConfig`](config::ContestConfig) profile, then build a
//! [`TestRunner`](runner::TestRunner) and execute it against a
//! [`TestWatcher`](reporter::TestWatcher). The resulting [`RunRecord`](runner::RunRecord) holds
//! every verdict and the process exit code.

pub mod config;
pub mod errors;
pub mod list;
pub mod plan;
pub mod record;
pub mod reporter;
pub mod runner;
pub mod signal;
pub mod test_filter;
