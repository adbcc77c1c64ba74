// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line front end for contest.
//!
//! A test crate registers its tests in a [`TestSuite`](contest_runner::list::TestSuite) and hands
//! it to a [`Harness`], typically from a `harness = false` test target:
//!
//! ```no_run
//! use contest_harness::Harness;
//! use contest_runner::list::{TestDescriptor, TestSuite};
//!
//! fn main() -> color_eyre::Result<()> {
//!     let suite = TestSuite::new().test(TestDescriptor::new("test_power_on", |cx, _| {
//!         cx.expect(true, "supply is up");
//!         Ok(())
//!     }));
//!     Harness::new(suite).main()
//! }
//! ```

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

pub use dispatch::{ContestApp, Harness};
pub use errors::ExpectedError;
pub use output::{Color, OutputWriter};
