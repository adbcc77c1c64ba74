// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test descriptors, parameter sets and setup files.
//!
//! Tests are registered with a [`TestSuite`], then validated into a [`TestList`] bound to the
//! [`SetupFile`] the run will use.

mod descriptor;
mod params;
mod setup_file;
mod test_list;

pub use descriptor::*;
pub use params::*;
pub use setup_file::*;
pub use test_list::*;
