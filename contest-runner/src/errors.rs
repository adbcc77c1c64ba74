// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by contest.
//!
//! Errors in this module are configuration and setup errors: they are reported before a plan is
//! built and abort the run with
//! [`GENERAL_ERROR`](contest_metadata::ContestExitCode::GENERAL_ERROR). Failures of individual
//! test invocations are not errors in this sense; they are represented by
//! [`TestFailure`](crate::runner::TestFailure) and turned into verdicts.

use crate::test_filter::FilterKind;
use camino::Utf8PathBuf;
use config::ConfigError;
use std::{error, fmt};
use thiserror::Error;

/// An error that occurred while parsing the config.
#[derive(Debug, Error)]
#[error("failed to parse contest config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file for this error.
    pub fn config_file(&self) -> &Utf8PathBuf {
        &self.config_file
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while parsing a config.
///
/// Returned by [`ConfigParseError::kind`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// An error occurred while building the config.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// An error occurred while deserializing the config.
    #[error(transparent)]
    DeserializeError(Box<serde_path_to_error::Error<ConfigError>>),
}

/// An error which indicates that a profile was requested but not known to contest.
#[derive(Clone, Debug, Error)]
#[error("profile `{profile}` not found (known profiles: {})", .all_profiles.join(", "))]
pub struct ProfileNotFound {
    profile: String,
    all_profiles: Vec<String>,
}

impl ProfileNotFound {
    pub(crate) fn new(
        profile: impl Into<String>,
        all_profiles: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let mut all_profiles: Vec<_> = all_profiles.into_iter().map(|s| s.into()).collect();
        all_profiles.sort_unstable();
        Self {
            profile: profile.into(),
            all_profiles,
        }
    }
}

/// An error returned while parsing a [`TestPriority`](crate::config::TestPriority) from a string.
#[derive(Clone, Debug, Error)]
#[error("unrecognized test priority: {input}\n(known values: low, medium, high)")]
pub struct TestPriorityParseError {
    input: String,
}

impl TestPriorityParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// An error that occurred while building a [`TestFilter`](crate::test_filter::TestFilter).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum TestFilterBuildError {
    /// The filter kind is not known.
    #[error(
        "unknown filter kind `{input}`\n(known kinds: {})",
        FilterKind::variants().join(", ")
    )]
    UnknownFilterKind {
        /// The input that was provided.
        input: String,
    },

    /// A filter was specified without any values.
    #[error("filter `{kind}` has no values")]
    EmptyFilterValues {
        /// The kind of filter.
        kind: FilterKind,
    },

    /// A command-line filter didn't have the `kind=value,...` form.
    #[error("filter `{input}` must be in the format `kind=value1,value2`")]
    InvalidSyntax {
        /// The input that was provided.
        input: String,
    },
}

/// The kind of per-test function a descriptor can refer to by name.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FunctionKind {
    /// A custom setup function.
    Setup,

    /// A custom teardown function.
    Teardown,
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::Teardown => write!(f, "teardown"),
        }
    }
}

/// An error that occurred while building a [`TestList`](crate::list::TestList) from a
/// [`TestSuite`](crate::list::TestSuite).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum TestListBuildError {
    /// A test was registered with an empty name.
    #[error("a test was registered with an empty name")]
    EmptyTestName,

    /// Two tests share the same name.
    #[error("test `{name}` was registered more than once")]
    DuplicateTestName {
        /// The duplicated name.
        name: String,
    },

    /// Two parameter sets of one test have the same display suffix.
    #[error("test `{test_name}` has more than one parameter set named `[{suffix}]`")]
    DuplicateParameterSet {
        /// The test name.
        test_name: String,

        /// The duplicated suffix.
        suffix: String,
    },

    /// The requested setup file was not registered.
    #[error("setup file `{name}` not found (known setup files: {})", .known.join(", "))]
    SetupFileNotFound {
        /// The requested setup file.
        name: String,

        /// The setup files that are known.
        known: Vec<String>,
    },

    /// A test refers to a custom setup or teardown function that doesn't exist.
    #[error(
        "test `{test_name}` refers to custom {kind} function `{function}`, \
         which is not defined in setup file `{setup_file}`"
    )]
    UnknownCustomFunction {
        /// The test name.
        test_name: String,

        /// Whether this is a setup or a teardown function.
        kind: FunctionKind,

        /// The name of the missing function.
        function: String,

        /// The setup file that was searched.
        setup_file: String,
    },
}

/// An error returned when a test body asks for a parameter that its parameter set doesn't have.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum ParamAccessError {
    /// A positional argument was requested that doesn't exist.
    #[error("positional argument {index} requested, but {available} available")]
    MissingPositional {
        /// The requested index.
        index: usize,

        /// The number of positional arguments available.
        available: usize,
    },

    /// A named argument was requested that doesn't exist.
    #[error("named argument `{name}` requested, but not present")]
    MissingNamed {
        /// The requested name.
        name: String,
    },

    /// The test was not run with arguments of the requested shape.
    #[error("expected {expected} arguments, found {actual}")]
    ShapeMismatch {
        /// The requested shape.
        expected: &'static str,

        /// The actual shape.
        actual: &'static str,
    },
}

/// An error that occurred while reading an execution record.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecordReadError {
    /// The record file couldn't be read.
    #[error("failed to read execution record from `{path}`")]
    Read {
        /// The path that was read.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// The record file couldn't be deserialized.
    #[error("failed to deserialize execution record from `{path}`")]
    Deserialize {
        /// The path that was read.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },

    /// The record was written by an incompatible version.
    #[error("execution record at `{path}` has version {actual}, expected {expected}")]
    VersionMismatch {
        /// The path that was read.
        path: Utf8PathBuf,

        /// The version this build understands.
        expected: u32,

        /// The version found in the file.
        actual: u32,
    },
}

/// An error that occurred while writing or removing an execution record.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecordWriteError {
    /// The parent directory couldn't be created.
    #[error("failed to create directory `{path}`")]
    CreateDir {
        /// The directory.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// The record couldn't be serialized.
    #[error("failed to serialize execution record")]
    Serialize {
        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },

    /// The record file couldn't be written.
    #[error("failed to write execution record to `{path}`")]
    Write {
        /// The path.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// The record file couldn't be removed.
    #[error("failed to remove execution record at `{path}`")]
    Remove {
        /// The path.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },
}

/// Displays an error along with its chain of sources, on a single line.
///
/// Each source is separated from the previous one by `: `.
pub struct DisplayErrorChain<'a> {
    error: &'a (dyn error::Error + 'a),
}

impl<'a> DisplayErrorChain<'a> {
    /// Creates a new `DisplayErrorChain`.
    pub fn new(error: &'a (dyn error::Error + 'a)) -> Self {
        Self { error }
    }
}

impl fmt::Display for DisplayErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        let mut source = self.error.source();
        while let Some(error) = source {
            write!(f, ": {error}")?;
            source = error.source();
        }
        Ok(())
    }
}
