// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::DisplayErrorChain;
use contest_metadata::Verdict;
use std::{error::Error, fmt};
use thiserror::Error;

/// The phase of an invocation in which a function was called.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Global setup, once before the first test.
    GlobalSetup,

    /// Per-test setup.
    Setup,

    /// The test body.
    Body,

    /// Per-test teardown.
    Teardown,

    /// Global teardown, once at the end of the run.
    GlobalTeardown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GlobalSetup => write!(f, "global setup"),
            Self::Setup => write!(f, "setup"),
            Self::Body => write!(f, "test body"),
            Self::Teardown => write!(f, "teardown"),
            Self::GlobalTeardown => write!(f, "global teardown"),
        }
    }
}

/// Why an invocation failed.
///
/// Errors returned by user functions are rendered into messages when they are caught, so a
/// `TestFailure` is plain data and compares deterministically.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum TestFailure {
    /// The test was not run because global setup failed.
    #[error("`{test_name}` was not run because global setup failed: {cause}")]
    GlobalSetupFailed {
        /// The display name of the test.
        test_name: String,

        /// The global setup failure message.
        cause: String,
    },

    /// Setup returned an error.
    #[error("setup failed: {message}")]
    Setup {
        /// The error message.
        message: String,
    },

    /// The test body returned an error.
    #[error("{message}")]
    Body {
        /// The error message.
        message: String,
    },

    /// A function panicked.
    #[error("panicked during {phase}: {message}")]
    Panicked {
        /// The phase that panicked.
        phase: Phase,

        /// The panic payload, if it was a string.
        message: String,
    },

    /// The test body recorded expectation failures.
    #[error("{} expectation(s) failed: {}", .failures.len(), .failures.join("; "))]
    Expectations {
        /// The failed expectations, in the order they were recorded.
        failures: Vec<String>,
    },

    /// Teardown returned an error.
    #[error("teardown failed: {message}")]
    Teardown {
        /// The error message.
        message: String,
    },

    /// Global setup returned an error.
    #[error("global setup failed: {message}")]
    GlobalSetup {
        /// The error message.
        message: String,
    },

    /// Global teardown returned an error.
    #[error("global teardown failed: {message}")]
    GlobalTeardown {
        /// The error message.
        message: String,
    },

    /// One or more parameter sets of a parameterized test failed.
    #[error("{failed} of {total} parameter sets failed")]
    ParameterizedGroup {
        /// The number of failed sets.
        failed: usize,

        /// The number of sets that ran.
        total: usize,
    },
}

impl TestFailure {
    pub(crate) fn from_error(phase: Phase, error: &(dyn Error + 'static)) -> Self {
        let message = DisplayErrorChain::new(error).to_string();
        match phase {
            Phase::GlobalSetup => Self::GlobalSetup { message },
            Phase::Setup => Self::Setup { message },
            Phase::Body => Self::Body { message },
            Phase::Teardown => Self::Teardown { message },
            Phase::GlobalTeardown => Self::GlobalTeardown { message },
        }
    }

    /// Returns true if this failure was synthesized because global setup failed.
    pub fn is_global_setup_gate(&self) -> bool {
        matches!(self, Self::GlobalSetupFailed { .. })
    }
}

/// The outcome of a single invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExecutionOutcome {
    /// The invocation passed.
    Pass,

    /// The invocation failed.
    Fail(TestFailure),

    /// The invocation passed, but recorded warnings.
    Inconclusive(Vec<String>),

    /// The invocation was skipped, with the reason.
    Skip(String),
}

impl ExecutionOutcome {
    /// Returns the verdict for this outcome.
    pub fn verdict(&self) -> Verdict {
        match self {
            Self::Pass => Verdict::Pass,
            Self::Fail(_) => Verdict::Fail,
            Self::Inconclusive(_) => Verdict::Inconclusive,
            Self::Skip(_) => Verdict::Skip,
        }
    }

    /// Returns the failure, if this outcome is a failure.
    pub fn failure(&self) -> Option<&TestFailure> {
        match self {
            Self::Fail(failure) => Some(failure),
            _ => None,
        }
    }
}
