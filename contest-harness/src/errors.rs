// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use camino::Utf8PathBuf;
use contest_metadata::ContestExitCode;
use contest_runner::errors::*;
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An error that prevented the test plan from running, as opposed to a test failure.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("profile not found")]
    ProfileNotFound {
        #[from]
        err: ProfileNotFound,
    },
    #[error("test list build error")]
    TestListBuildError {
        #[from]
        err: TestListBuildError,
    },
    #[error("execution record read error")]
    RecordReadError {
        #[from]
        err: RecordReadError,
    },
    #[error("no execution record found at {path}")]
    ReplayRecordNotFound { path: Utf8PathBuf },
    #[error("execution record write error")]
    RecordWriteError {
        #[from]
        err: RecordWriteError,
    },
    #[error("error writing output")]
    WriteOutputError {
        #[source]
        err: std::io::Error,
    },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    ///
    /// Every error outside the test plan maps to the same code, so that callers can tell it apart
    /// from test failures.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigParseError { .. }
            | Self::ProfileNotFound { .. }
            | Self::TestListBuildError { .. }
            | Self::RecordReadError { .. }
            | Self::ReplayRecordNotFound { .. }
            | Self::RecordWriteError { .. }
            | Self::WriteOutputError { .. } => ContestExitCode::GENERAL_ERROR,
        }
    }

    /// Displays this error to stderr.
    pub(crate) fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::ConfigParseError { err } => {
                tracing::error!(
                    "failed to parse contest config at `{}`",
                    err.config_file().style(styles.bold)
                );
                err.source()
            }
            Self::ProfileNotFound { err } => {
                tracing::error!("{err}");
                None
            }
            Self::TestListBuildError { err } => {
                tracing::error!("invalid test suite: {err}");
                None
            }
            Self::RecordReadError { err } => {
                tracing::error!("{err}");
                err.source()
            }
            Self::ReplayRecordNotFound { path } => {
                tracing::error!(
                    "no execution record found at `{}` to replay",
                    path.style(styles.bold)
                );
                None
            }
            Self::RecordWriteError { err } => {
                tracing::error!("{err}");
                err.source()
            }
            Self::WriteOutputError { err } => {
                tracing::error!("failed to write output");
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            tracing::error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
