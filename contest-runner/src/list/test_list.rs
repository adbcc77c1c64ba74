// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{SetupFile, TestDescriptor};
use crate::errors::{FunctionKind, TestListBuildError};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::debug;

/// The output of test discovery: registered tests, in discovery order, and the setup files they
/// can be run with.
#[derive(Debug, Default)]
pub struct TestSuite {
    tests: Vec<TestDescriptor>,
    setup_files: IndexMap<String, SetupFile>,
}

impl TestSuite {
    /// Creates a new, empty suite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a test.
    pub fn test(mut self, descriptor: TestDescriptor) -> Self {
        self.tests.push(descriptor);
        self
    }

    /// Registers a setup file. The first setup file registered is the default one.
    pub fn setup_file(mut self, setup_file: SetupFile) -> Self {
        self.setup_files
            .insert(setup_file.name().to_owned(), setup_file);
        self
    }

    /// Returns the registered tests.
    pub fn tests(&self) -> &[TestDescriptor] {
        &self.tests
    }

    /// Returns the names of the registered setup files.
    pub fn setup_file_names(&self) -> impl Iterator<Item = &str> {
        self.setup_files.keys().map(String::as_str)
    }
}

/// A validated list of tests, bound to the setup file they will be run with.
#[derive(Debug)]
pub struct TestList {
    tests: Vec<TestDescriptor>,
    setup_file: SetupFile,
}

impl TestList {
    /// Validates `suite` and binds it to a setup file.
    ///
    /// If `setup_file` is `None`, the first setup file registered with the suite is used, or an
    /// empty one if the suite has none.
    pub fn new(suite: TestSuite, setup_file: Option<&str>) -> Result<Self, TestListBuildError> {
        let TestSuite {
            tests,
            mut setup_files,
        } = suite;

        let setup_file = match setup_file {
            Some(name) => setup_files.shift_remove(name).ok_or_else(|| {
                TestListBuildError::SetupFileNotFound {
                    name: name.to_owned(),
                    known: setup_files.keys().cloned().collect(),
                }
            })?,
            None => setup_files
                .shift_remove_index(0)
                .map(|(_, setup_file)| setup_file)
                .unwrap_or_default(),
        };

        let mut names = HashSet::with_capacity(tests.len());
        for test in &tests {
            if test.name().is_empty() {
                return Err(TestListBuildError::EmptyTestName);
            }
            if !names.insert(test.name()) {
                return Err(TestListBuildError::DuplicateTestName {
                    name: test.name().to_owned(),
                });
            }
            Self::check_custom(test, FunctionKind::Setup, test.custom_setup_name(), &setup_file)?;
            Self::check_custom(
                test,
                FunctionKind::Teardown,
                test.custom_teardown_name(),
                &setup_file,
            )?;

            if let Some(parameterization) = test.parameterization() {
                let mut suffixes = HashSet::new();
                for set in parameterization.sets() {
                    let suffix = set.suffix();
                    if !suffixes.insert(suffix.clone()) {
                        return Err(TestListBuildError::DuplicateParameterSet {
                            test_name: test.name().to_owned(),
                            suffix: suffix.into_owned(),
                        });
                    }
                }
            }
        }

        debug!(
            "built test list with {} tests using setup file `{}`",
            tests.len(),
            setup_file.name(),
        );
        Ok(Self { tests, setup_file })
    }

    fn check_custom(
        test: &TestDescriptor,
        kind: FunctionKind,
        function: Option<&str>,
        setup_file: &SetupFile,
    ) -> Result<(), TestListBuildError> {
        match function {
            Some(function) if !setup_file.has_function(function) => {
                Err(TestListBuildError::UnknownCustomFunction {
                    test_name: test.name().to_owned(),
                    kind,
                    function: function.to_owned(),
                    setup_file: setup_file.name().to_owned(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Returns the tests in discovery order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TestDescriptor> {
        self.tests.iter()
    }

    /// Returns the test with the given name.
    pub fn get(&self, name: &str) -> Option<&TestDescriptor> {
        self.tests.iter().find(|test| test.name() == name)
    }

    /// Returns the number of tests.
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Returns true if there are no tests.
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Returns the setup file this list is bound to.
    pub fn setup_file(&self) -> &SetupFile {
        &self.setup_file
    }
}
