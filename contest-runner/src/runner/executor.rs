// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runs a single invocation: skip check, setup, body, teardown.

use super::{ExecutionOutcome, Phase, TestContext, TestFailure};
use crate::{
    list::{FixtureFn, ParameterSet, SetupFile, TestArgs, TestDescriptor, TestResult},
    reporter::{TestInstance, TestWatcher},
};
use contest_metadata::{InvocationKind, Verdict};
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
};
use tracing::debug;

/// One invocation of a test or parameter set.
#[derive(Clone, Copy, Debug)]
pub(super) struct Invocation<'a> {
    pub(super) descriptor: &'a TestDescriptor,
    pub(super) set: Option<&'a ParameterSet>,
    pub(super) display_name: &'a str,
    pub(super) loop_index: usize,
}

impl Invocation<'_> {
    fn instance(&self) -> TestInstance<'_> {
        TestInstance {
            display_name: self.display_name,
            kind: InvocationKind::Test,
            test_name: self.descriptor.name(),
            descriptor: Some(self.descriptor),
            set: self.set,
            loop_index: self.loop_index,
        }
    }

    fn args(&self) -> TestArgs<'_> {
        match self.set {
            Some(set) => set.value().as_args(),
            None => TestArgs::None,
        }
    }
}

/// Executes invocations against a setup file.
#[derive(Debug)]
pub(super) struct TestExecutor<'a> {
    setup_file: &'a SetupFile,
    global_setup_failure: Option<String>,
}

impl<'a> TestExecutor<'a> {
    pub(super) fn new(setup_file: &'a SetupFile) -> Self {
        Self {
            setup_file,
            global_setup_failure: None,
        }
    }

    pub(super) fn set_global_setup_failure(&mut self, failure: &TestFailure) {
        self.global_setup_failure = Some(failure.to_string());
    }

    pub(super) fn global_setup_failed(&self) -> bool {
        self.global_setup_failure.is_some()
    }

    /// Evaluates the skip condition of `descriptor`.
    ///
    /// Returns `None` once global setup has failed: that gate takes precedence over skipping, and
    /// deferred conditions are not evaluated.
    pub(super) fn skip_reason(&self, descriptor: &TestDescriptor) -> Option<String> {
        if self.global_setup_failed() {
            return None;
        }
        descriptor
            .skip_condition()
            .and_then(|condition| condition.evaluate())
            .map(ToOwned::to_owned)
    }

    /// Runs one invocation end to end and reports it to `watcher`.
    ///
    /// `skip` is the pre-evaluated skip reason, if any.
    pub(super) fn run_invocation(
        &self,
        cx: &mut TestContext,
        watcher: &mut dyn TestWatcher,
        invocation: &Invocation<'_>,
        skip: Option<&str>,
    ) -> ExecutionOutcome {
        cx.begin(
            invocation.display_name,
            invocation.loop_index,
            invocation.set.map(ParameterSet::index),
        );
        watcher.test_started(&invocation.instance());

        let outcome = self.execute(cx, invocation, skip);
        debug!(
            "{}: {}",
            invocation.display_name,
            outcome.verdict().as_str()
        );

        report(watcher, &outcome);
        watcher.test_finished();
        cx.reset();
        outcome
    }

    fn execute(
        &self,
        cx: &mut TestContext,
        invocation: &Invocation<'_>,
        skip: Option<&str>,
    ) -> ExecutionOutcome {
        if let Some(cause) = &self.global_setup_failure {
            return ExecutionOutcome::Fail(TestFailure::GlobalSetupFailed {
                test_name: invocation.display_name.to_owned(),
                cause: cause.clone(),
            });
        }
        if let Some(reason) = skip {
            return ExecutionOutcome::Skip(reason.to_owned());
        }

        let descriptor = invocation.descriptor;
        let mut test_error = None;

        if let Some(setup) = self.setup_file.resolve_setup(descriptor) {
            debug!("{}: running setup", invocation.display_name);
            test_error = call_guarded(Phase::Setup, || setup(cx)).err();
        }

        if test_error.is_none() {
            debug!("{}: running test body", invocation.display_name);
            let args = invocation.args();
            test_error = call_guarded(Phase::Body, || descriptor.call(cx, args)).err();

            // Expectations never abort the body. They turn into a failure once it has returned.
            let failures = cx.take_expectation_failures();
            if test_error.is_none() && !failures.is_empty() {
                test_error = Some(TestFailure::Expectations { failures });
            }
        }

        let mut teardown_error = None;
        if let Some(teardown) = self.setup_file.resolve_teardown(descriptor) {
            debug!("{}: running teardown", invocation.display_name);
            teardown_error = call_guarded(Phase::Teardown, || teardown(cx)).err();
        }

        // The teardown error is captured last and is the one reported if both are set.
        let failure = teardown_error.or(test_error);
        classify(cx, failure)
    }

    /// Runs global setup or teardown as a pseudo-test and reports it to `watcher`.
    pub(super) fn run_global(
        &self,
        cx: &mut TestContext,
        watcher: &mut dyn TestWatcher,
        kind: InvocationKind,
    ) -> Option<ExecutionOutcome> {
        let (f, phase, name) = match kind {
            InvocationKind::GlobalSetup => (
                self.setup_file.global_setup_fn()?,
                Phase::GlobalSetup,
                GLOBAL_SETUP_NAME,
            ),
            InvocationKind::GlobalTeardown => (
                self.setup_file.global_teardown_fn()?,
                Phase::GlobalTeardown,
                GLOBAL_TEARDOWN_NAME,
            ),
            InvocationKind::Test => return None,
        };

        cx.begin(name, 1, None);
        watcher.test_started(&TestInstance {
            display_name: name,
            kind,
            test_name: name,
            descriptor: None,
            set: None,
            loop_index: 1,
        });

        debug!("running {phase}");
        let failure = call_fixture(phase, f, cx).err();
        let outcome = classify(cx, failure);

        report(watcher, &outcome);
        watcher.test_finished();
        cx.reset();
        Some(outcome)
    }
}

/// The display name of the global setup pseudo-test.
pub const GLOBAL_SETUP_NAME: &str = "global_setup";

/// The display name of the global teardown pseudo-test.
pub const GLOBAL_TEARDOWN_NAME: &str = "global_teardown";

fn classify(cx: &mut TestContext, failure: Option<TestFailure>) -> ExecutionOutcome {
    // Expectations recorded outside the body, for example in teardown, still fail the
    // invocation.
    let late_failures = cx.take_expectation_failures();
    match Verdict::classify(&late_failures, failure.is_some(), cx.warnings()) {
        Verdict::Fail => ExecutionOutcome::Fail(failure.unwrap_or(TestFailure::Expectations {
            failures: late_failures,
        })),
        Verdict::Inconclusive => ExecutionOutcome::Inconclusive(cx.warnings().to_vec()),
        _ => ExecutionOutcome::Pass,
    }
}

fn report(watcher: &mut dyn TestWatcher, outcome: &ExecutionOutcome) {
    match outcome {
        ExecutionOutcome::Pass => watcher.test_succeeded(),
        ExecutionOutcome::Fail(failure) => watcher.test_failed(failure),
        ExecutionOutcome::Inconclusive(warnings) => watcher.test_inconclusive(warnings),
        ExecutionOutcome::Skip(reason) => watcher.test_skipped(reason),
    }
}

fn call_fixture(phase: Phase, f: &FixtureFn, cx: &mut TestContext) -> Result<(), TestFailure> {
    call_guarded(phase, || f(cx))
}

/// Calls `f`, converting both returned errors and panics into a [`TestFailure`].
fn call_guarded(phase: Phase, f: impl FnOnce() -> TestResult) -> Result<(), TestFailure> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(error)) => Err(TestFailure::from_error(phase, &*error)),
        Err(payload) => Err(TestFailure::Panicked {
            phase,
            message: panic_message(&*payload),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "(non-string panic payload)".to_owned()
    }
}
