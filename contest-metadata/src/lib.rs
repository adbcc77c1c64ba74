// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Machine-readable data produced by contest runs.
//!
//! This crate contains the types that cross the boundary between the contest
//! engine and outside tooling: the [`Verdict`] assigned to every test
//! invocation, the documented process [exit codes](ContestExitCode), and the
//! on-disk [`ExecutionRecord`] used to replay a previous run's selection.

mod exit_codes;
mod record;
mod verdict;

pub use exit_codes::*;
pub use record::*;
pub use verdict::*;
