// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration support for contest.
//!
//! Configuration is read from `.config/contest.toml`, layered over an embedded default config, and
//! resolved per profile into a [`RunConfig`].

mod core;
mod loop_count;
mod priority;
mod run_config;

pub use self::core::*;
pub use loop_count::*;
pub use priority::*;
pub use run_config::*;
