// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::Verdict;

/// Documented exit codes for contest runs.
///
/// The exit code of a run is derived from the verdicts of all test invocations in it. Errors
/// outside the test plan itself (bad configuration, unknown tests, unreadable records) always
/// result in [`GENERAL_ERROR`](Self::GENERAL_ERROR).
pub enum ContestExitCode {}

impl ContestExitCode {
    /// Every test invocation passed or was skipped.
    pub const OK: i32 = 0;

    /// An error occurred outside the test plan, for example while loading configuration.
    pub const GENERAL_ERROR: i32 = 1;

    /// One or more test invocations failed.
    pub const TEST_FAILURE: i32 = 2;

    /// No invocation failed, but at least one was inconclusive.
    pub const INCONCLUSIVE: i32 = 3;

    /// Computes the exit code for a run from the verdicts of its invocations.
    ///
    /// Failures dominate inconclusive results. A run with no invocations exits with
    /// [`OK`](Self::OK).
    pub fn from_verdicts(verdicts: impl IntoIterator<Item = Verdict>) -> i32 {
        let mut inconclusive = false;
        for verdict in verdicts {
            match verdict {
                Verdict::Fail => return Self::TEST_FAILURE,
                Verdict::Inconclusive => inconclusive = true,
                Verdict::Pass | Verdict::Skip | Verdict::Unknown => {}
            }
        }

        if inconclusive {
            Self::INCONCLUSIVE
        } else {
            Self::OK
        }
    }
}
