// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{ParamValue, ParameterSet, ParameterizedOptions, TestArgs};
use crate::{config::TestPriority, runner::TestContext};
use debug_ignore::DebugIgnore;
use std::{collections::BTreeSet, error::Error, fmt};

/// The error type returned by test bodies, setup and teardown functions.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// The result type returned by test bodies, setup and teardown functions.
pub type TestResult = Result<(), BoxError>;

/// A test body.
pub type TestFn = Box<dyn Fn(&mut TestContext, TestArgs<'_>) -> TestResult>;

/// A setup or teardown function.
pub type FixtureFn = Box<dyn Fn(&mut TestContext) -> TestResult>;

/// A discovered test function, along with the metadata that controls how it is run.
///
/// Descriptors are created once at discovery time through the builder methods, and are immutable
/// for the duration of a run.
#[derive(Debug)]
pub struct TestDescriptor {
    name: String,
    priority: TestPriority,
    tags: BTreeSet<String>,
    skip: Option<SkipCondition>,
    custom_setup: Option<String>,
    custom_teardown: Option<String>,
    requirements: Vec<String>,
    automation_ids: Vec<String>,
    parameters: Option<Parameterization>,
    body: DebugIgnore<TestFn>,
}

impl TestDescriptor {
    /// Creates a new descriptor with default metadata.
    pub fn new(
        name: impl Into<String>,
        body: impl Fn(&mut TestContext, TestArgs<'_>) -> TestResult + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            priority: TestPriority::default(),
            tags: BTreeSet::new(),
            skip: None,
            custom_setup: None,
            custom_teardown: None,
            requirements: Vec::new(),
            automation_ids: Vec::new(),
            parameters: None,
            body: DebugIgnore(Box::new(body)),
        }
    }

    /// Sets the priority.
    pub fn priority(mut self, priority: TestPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Adds a tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Adds several tags.
    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Skips the test if `condition` is true.
    pub fn skip_if(mut self, condition: bool, reason: impl Into<String>) -> Self {
        self.skip = Some(SkipCondition {
            when: SkipWhen::Fixed(condition),
            reason: reason.into(),
        });
        self
    }

    /// Skips the test if `condition` returns true when the test is about to run.
    pub fn skip_when(
        mut self,
        condition: impl Fn() -> bool + 'static,
        reason: impl Into<String>,
    ) -> Self {
        self.skip = Some(SkipCondition {
            when: SkipWhen::Deferred(DebugIgnore(Box::new(condition))),
            reason: reason.into(),
        });
        self
    }

    /// Uses the named function from the setup file instead of the standard setup.
    pub fn custom_setup(mut self, name: impl Into<String>) -> Self {
        self.custom_setup = Some(name.into());
        self
    }

    /// Uses the named function from the setup file instead of the standard teardown.
    pub fn custom_teardown(mut self, name: impl Into<String>) -> Self {
        self.custom_teardown = Some(name.into());
        self
    }

    /// Sets the requirement IDs this test covers.
    pub fn requirements(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.requirements = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the automation IDs of this test.
    pub fn automation_ids(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.automation_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Parameterizes this test over `values`, indexed in order.
    pub fn parameterized(
        self,
        values: impl IntoIterator<Item = impl Into<ParamValue>>,
        options: ParameterizedOptions,
    ) -> Self {
        let sets = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| ParameterSet::new(index, value))
            .collect();
        self.parameterized_sets(sets, options)
    }

    /// Parameterizes this test over explicitly constructed sets.
    pub fn parameterized_sets(
        mut self,
        sets: Vec<ParameterSet>,
        options: ParameterizedOptions,
    ) -> Self {
        self.parameters = Some(Parameterization { sets, options });
        self
    }

    /// Returns the name of the test.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the priority of the test.
    pub fn test_priority(&self) -> TestPriority {
        self.priority
    }

    /// Returns the tags of the test.
    pub fn test_tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Returns the skip condition, if any.
    pub fn skip_condition(&self) -> Option<&SkipCondition> {
        self.skip.as_ref()
    }

    /// Returns the name of the custom setup function, if any.
    pub fn custom_setup_name(&self) -> Option<&str> {
        self.custom_setup.as_deref()
    }

    /// Returns the name of the custom teardown function, if any.
    pub fn custom_teardown_name(&self) -> Option<&str> {
        self.custom_teardown.as_deref()
    }

    /// Returns the requirement IDs.
    pub fn requirement_ids(&self) -> &[String] {
        &self.requirements
    }

    /// Returns the automation IDs.
    pub fn automation_id_list(&self) -> &[String] {
        &self.automation_ids
    }

    /// Returns the parameterization, if this test is parameterized.
    pub fn parameterization(&self) -> Option<&Parameterization> {
        self.parameters.as_ref()
    }

    /// Returns true if this test is parameterized.
    pub fn is_parameterized(&self) -> bool {
        self.parameters.is_some()
    }

    pub(crate) fn call(&self, cx: &mut TestContext, args: TestArgs<'_>) -> TestResult {
        (self.body.0)(cx, args)
    }
}

/// The sets and dispatch options of a parameterized test.
#[derive(Clone, Debug)]
pub struct Parameterization {
    sets: Vec<ParameterSet>,
    options: ParameterizedOptions,
}

impl Parameterization {
    /// Returns all sets, including deselected ones.
    pub fn sets(&self) -> &[ParameterSet] {
        &self.sets
    }

    /// Returns the sets that should execute.
    pub fn active_sets(&self) -> impl Iterator<Item = &ParameterSet> {
        self.sets.iter().filter(|set| set.should_run())
    }

    /// Returns the dispatch options.
    pub fn options(&self) -> ParameterizedOptions {
        self.options
    }
}

/// A skip condition plus the reason reported when it holds.
#[derive(Debug)]
pub struct SkipCondition {
    when: SkipWhen,
    reason: String,
}

impl SkipCondition {
    /// Evaluates the condition, returning the reason if the test should be skipped.
    pub fn evaluate(&self) -> Option<&str> {
        let skip = match &self.when {
            SkipWhen::Fixed(condition) => *condition,
            SkipWhen::Deferred(condition) => (condition.0)(),
        };
        skip.then_some(self.reason.as_str())
    }

    /// Returns the reason reported when the test is skipped.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

enum SkipWhen {
    Fixed(bool),
    Deferred(DebugIgnore<Box<dyn Fn() -> bool>>),
}

impl fmt::Debug for SkipWhen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(condition) => f.debug_tuple("Fixed").field(condition).finish(),
            Self::Deferred(_) => f.write_str("Deferred"),
        }
    }
}
