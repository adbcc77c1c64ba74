// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// The final classification of a single test invocation.
///
/// Exactly one verdict is assigned per invocation, including every parameter set of a
/// parameterized test.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub enum Verdict {
    /// No verdict has been assigned yet.
    #[default]
    Unknown,

    /// The test ran to completion without errors, failed expectations or warnings.
    Pass,

    /// Setup, the test body or teardown raised an error, or an expectation failed.
    Fail,

    /// The test completed without errors, but recorded warnings.
    Inconclusive,

    /// The test's skip condition was true, so nothing was run.
    Skip,
}

impl Verdict {
    /// Returns the list of all verdicts, in declaration order.
    pub const ALL: &'static [Verdict] = &[
        Verdict::Unknown,
        Verdict::Pass,
        Verdict::Fail,
        Verdict::Inconclusive,
        Verdict::Skip,
    ];

    /// Classifies a finished (non-skipped) invocation.
    ///
    /// A raised error always produces [`Verdict::Fail`]. Otherwise, any failed expectation also
    /// fails the test. Warnings downgrade an otherwise passing test to
    /// [`Verdict::Inconclusive`].
    pub fn classify(expectation_failures: &[String], raised: bool, warnings: &[String]) -> Self {
        if raised || !expectation_failures.is_empty() {
            Verdict::Fail
        } else if !warnings.is_empty() {
            Verdict::Inconclusive
        } else {
            Verdict::Pass
        }
    }

    /// Combines the verdicts of several invocations (for example, the parameter sets of one
    /// parameterized test) into a single verdict.
    ///
    /// The precedence is `FAIL > INCONCLUSIVE > PASS`. Skipped and unknown verdicts do not
    /// contribute, unless every input was skipped, in which case the result is
    /// [`Verdict::Skip`]. An empty input produces [`Verdict::Unknown`].
    pub fn aggregate(verdicts: impl IntoIterator<Item = Verdict>) -> Self {
        let mut any = false;
        let mut all_skipped = true;
        let mut acc = Verdict::Unknown;

        for verdict in verdicts {
            any = true;
            match verdict {
                Verdict::Fail => return Verdict::Fail,
                Verdict::Inconclusive => {
                    all_skipped = false;
                    acc = Verdict::Inconclusive;
                }
                Verdict::Pass => {
                    all_skipped = false;
                    if acc != Verdict::Inconclusive {
                        acc = Verdict::Pass;
                    }
                }
                Verdict::Skip => {}
                Verdict::Unknown => all_skipped = false,
            }
        }

        if !any {
            Verdict::Unknown
        } else if all_skipped {
            Verdict::Skip
        } else {
            acc
        }
    }

    /// Returns true if this verdict counts as a failure for the run.
    #[inline]
    pub fn is_failure(self) -> bool {
        self == Verdict::Fail
    }

    /// Returns true if this verdict is compatible with a successful run: passed or skipped.
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Verdict::Pass | Verdict::Skip)
    }

    /// Returns the string representation of this verdict.
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Unknown => "UNKNOWN",
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
            Verdict::Inconclusive => "INCONCLUSIVE",
            Verdict::Skip => "SKIP",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = VerdictParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verdict::ALL
            .iter()
            .copied()
            .find(|verdict| verdict.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| VerdictParseError {
                input: s.to_owned(),
            })
    }
}

/// An error returned while parsing a [`Verdict`] from a string.
#[derive(Clone, Debug, Error)]
#[error(
    "unrecognized verdict: {input}\n(known values: unknown, pass, fail, inconclusive, skip)"
)]
pub struct VerdictParseError {
    input: String,
}
