// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report the progress and results of a run.
//!
//! The runner communicates results exclusively through the [`TestWatcher`] trait. This module
//! provides the trait and the stock watchers: a [`ConsoleReporter`] for humans, a
//! [`StatusPublisher`] for out-of-band status queries, and a [`RecordingWatcher`] that keeps the
//! raw event stream.

mod console;
mod recording;
mod status;

pub use console::*;
pub use recording::*;
pub use status::*;

use crate::{
    config::LoopCount,
    list::{ParameterSet, TestDescriptor},
    runner::{RunRecord, TestFailure},
};
use contest_metadata::{InvocationKind, Verdict};

/// Receives lifecycle notifications from the runner.
///
/// For every invocation the runner calls [`test_started`](Self::test_started), then exactly one of
/// the result methods, then [`test_finished`](Self::test_finished). Run-level hooks have no-op
/// default implementations.
pub trait TestWatcher {
    /// Called once before global setup.
    fn run_started(&mut self, info: &RunStartedInfo) {
        let _ = info;
    }

    /// An invocation is starting.
    fn test_started(&mut self, instance: &TestInstance<'_>);

    /// The invocation was skipped.
    #[doc(alias = "test_skip")]
    fn test_skipped(&mut self, reason: &str);

    /// The invocation passed.
    fn test_succeeded(&mut self);

    /// The invocation failed.
    fn test_failed(&mut self, failure: &TestFailure);

    /// The invocation passed but recorded warnings.
    fn test_inconclusive(&mut self, warnings: &[String]);

    /// The invocation has finished.
    fn test_finished(&mut self);

    /// All attempted sets of a parameterized test have finished.
    ///
    /// `failure` is set if the aggregate verdict is a failure.
    fn group_finished(&mut self, name: &str, verdict: Verdict, failure: Option<&TestFailure>) {
        let _ = (name, verdict, failure);
    }

    /// Called once after global teardown.
    fn run_finished(&mut self, record: &RunRecord) {
        let _ = record;
    }
}

/// Information about a run that is about to start.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RunStartedInfo {
    /// The number of tests in the execution plan.
    pub plan_len: usize,

    /// How many times the plan is repeated.
    pub loop_count: LoopCount,

    /// The seed of the run's random number generator.
    pub seed: u64,

    /// Whether the plan is in random order.
    pub random_execution: bool,
}

/// Describes the invocation passed to [`TestWatcher::test_started`].
#[derive(Clone, Copy, Debug)]
pub struct TestInstance<'a> {
    /// The unique name of this invocation, including set and loop suffixes.
    pub display_name: &'a str,

    /// What kind of unit is being run.
    pub kind: InvocationKind,

    /// The base name of the test.
    pub test_name: &'a str,

    /// The test's descriptor. `None` for global setup and teardown.
    pub descriptor: Option<&'a TestDescriptor>,

    /// The parameter set, for parameterized tests.
    pub set: Option<&'a ParameterSet>,

    /// The loop iteration, starting at 1.
    pub loop_index: usize,
}

/// Fans notifications out to several watchers, in the order they were added.
#[derive(Default)]
pub struct WatcherSet<'a> {
    watchers: Vec<Box<dyn TestWatcher + 'a>>,
}

impl<'a> WatcherSet<'a> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a watcher.
    pub fn push(&mut self, watcher: impl TestWatcher + 'a) -> &mut Self {
        self.watchers.push(Box::new(watcher));
        self
    }

    /// Returns the number of watchers.
    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    /// Returns true if there are no watchers.
    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }
}

impl TestWatcher for WatcherSet<'_> {
    fn run_started(&mut self, info: &RunStartedInfo) {
        self.watchers.iter_mut().for_each(|w| w.run_started(info));
    }

    fn test_started(&mut self, instance: &TestInstance<'_>) {
        self.watchers.iter_mut().for_each(|w| w.test_started(instance));
    }

    fn test_skipped(&mut self, reason: &str) {
        self.watchers.iter_mut().for_each(|w| w.test_skipped(reason));
    }

    fn test_succeeded(&mut self) {
        self.watchers.iter_mut().for_each(|w| w.test_succeeded());
    }

    fn test_failed(&mut self, failure: &TestFailure) {
        self.watchers.iter_mut().for_each(|w| w.test_failed(failure));
    }

    fn test_inconclusive(&mut self, warnings: &[String]) {
        self.watchers
            .iter_mut()
            .for_each(|w| w.test_inconclusive(warnings));
    }

    fn test_finished(&mut self) {
        self.watchers.iter_mut().for_each(|w| w.test_finished());
    }

    fn group_finished(&mut self, name: &str, verdict: Verdict, failure: Option<&TestFailure>) {
        self.watchers
            .iter_mut()
            .for_each(|w| w.group_finished(name, verdict, failure));
    }

    fn run_finished(&mut self, record: &RunRecord) {
        self.watchers.iter_mut().for_each(|w| w.run_finished(record));
    }
}

impl<W: TestWatcher + ?Sized> TestWatcher for &mut W {
    fn run_started(&mut self, info: &RunStartedInfo) {
        (**self).run_started(info)
    }

    fn test_started(&mut self, instance: &TestInstance<'_>) {
        (**self).test_started(instance)
    }

    fn test_skipped(&mut self, reason: &str) {
        (**self).test_skipped(reason)
    }

    fn test_succeeded(&mut self) {
        (**self).test_succeeded()
    }

    fn test_failed(&mut self, failure: &TestFailure) {
        (**self).test_failed(failure)
    }

    fn test_inconclusive(&mut self, warnings: &[String]) {
        (**self).test_inconclusive(warnings)
    }

    fn test_finished(&mut self) {
        (**self).test_finished()
    }

    fn group_finished(&mut self, name: &str, verdict: Verdict, failure: Option<&TestFailure>) {
        (**self).group_finished(name, verdict, failure)
    }

    fn run_finished(&mut self, record: &RunRecord) {
        (**self).run_finished(record)
    }
}
