// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::TestPriorityParseError;
use serde::{Deserialize, Deserializer};
use std::{fmt, str::FromStr};

/// A test priority: low, medium or high.
///
/// Priority is the primary sort key of an execution plan. The sort order is from highest to
/// lowest priority.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum TestPriority {
    /// Run after everything else.
    Low,

    /// The default priority.
    #[default]
    Medium,

    /// Run before everything else.
    High,
}

impl TestPriority {
    /// Returns the string representation of this priority.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    fn rank(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }
}

impl PartialOrd for TestPriority {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TestPriority {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse the order to sort from highest to lowest priority.
        other.rank().cmp(&self.rank())
    }
}

impl fmt::Display for TestPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestPriority {
    type Err = TestPriorityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(TestPriorityParseError::new(s)),
        }
    }
}

impl<'de> Deserialize<'de> for TestPriority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
