// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::Deserialize;
use std::{fmt, num::NonZeroUsize};

/// The number of times the execution plan is repeated.
///
/// A requested loop count of 0 means "run once", the same as 1.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LoopCount(NonZeroUsize);

impl LoopCount {
    /// Run the plan exactly once.
    pub const ONCE: Self = Self(NonZeroUsize::MIN);

    /// Creates a new `LoopCount`, treating 0 as 1.
    pub fn new(count: usize) -> Self {
        Self(NonZeroUsize::new(count).unwrap_or(NonZeroUsize::MIN))
    }

    /// Returns the number of repetitions, always at least 1.
    pub fn get(self) -> usize {
        self.0.get()
    }

    /// Returns true if the plan is repeated more than once.
    pub fn is_repeated(self) -> bool {
        self.get() > 1
    }
}

impl Default for LoopCount {
    fn default() -> Self {
        Self::ONCE
    }
}

impl fmt::Display for LoopCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for LoopCount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;

        impl serde::de::Visitor<'_> for V {
            type Value = LoopCount;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "a non-negative integer")
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if v < 0 {
                    return Err(serde::de::Error::invalid_value(
                        serde::de::Unexpected::Signed(v),
                        &self,
                    ));
                }
                Ok(LoopCount::new(v as usize))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(LoopCount::new(v as usize))
            }
        }

        deserializer.deserialize_any(V)
    }
}
