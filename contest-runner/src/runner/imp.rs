// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    ExecutionOutcome, RunRecord, StopReason, TestContext,
    executor::{Invocation, TestExecutor},
};
use crate::{
    config::{LoopCount, RunConfig},
    list::{ParameterSet, TestDescriptor, TestList},
    plan::{ExecutionPlan, PlanOrder},
    reporter::{RunStartedInfo, TestWatcher},
    signal::StopHandle,
    test_filter::TestFilterBuilder,
};
use contest_metadata::{InvocationKind, RecordedInvocation};
use rand::{SeedableRng, rngs::StdRng};
use std::ops::ControlFlow;
use swrite::{SWrite, swrite};
use tracing::{debug, info, warn};

/// Test runner options.
#[derive(Debug, Default)]
pub struct TestRunnerBuilder {
    config: RunConfig,
    stop_handle: Option<StopHandle>,
}

impl TestRunnerBuilder {
    /// Creates a new builder for the given configuration.
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            stop_handle: None,
        }
    }

    /// Sets the handle used to request an interactive stop.
    pub fn set_stop_handle(&mut self, stop_handle: StopHandle) -> &mut Self {
        self.stop_handle = Some(stop_handle);
        self
    }

    /// Creates a new test runner for `list`.
    ///
    /// This resolves the selection, draws a seed if the configuration doesn't have one, and builds
    /// the execution plan.
    pub fn build(self, list: &TestList) -> TestRunner<'_> {
        let Self {
            config,
            stop_handle,
        } = self;

        let filter = TestFilterBuilder::new(
            config.filters.clone(),
            config.selected_tests.iter().cloned(),
            config.reverse_selection,
        )
        .build(list);

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        if config.random_execution {
            info!("using random execution order with seed {seed}");
        }

        let order = if config.random_execution {
            PlanOrder::Random(&mut rng)
        } else {
            PlanOrder::Priority
        };
        let plan = ExecutionPlan::build(list, &filter, order);
        info!(
            "{} of {} tests selected, loop count {}",
            plan.len(),
            list.len(),
            config.loop_count,
        );

        TestRunner {
            list,
            config,
            plan,
            rng,
            seed,
            stop_handle: stop_handle.unwrap_or_default(),
        }
    }
}

/// Context for running tests.
///
/// Created using [`TestRunnerBuilder::build`].
#[derive(Debug)]
pub struct TestRunner<'a> {
    list: &'a TestList,
    config: RunConfig,
    plan: ExecutionPlan<'a>,
    rng: StdRng,
    seed: u64,
    stop_handle: StopHandle,
}

impl<'a> TestRunner<'a> {
    /// Returns the execution plan.
    pub fn plan(&self) -> &ExecutionPlan<'a> {
        &self.plan
    }

    /// Returns the seed of the run's random number generator.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the configuration for this run.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Executes the plan, reporting every invocation to `watcher`.
    ///
    /// Failures of individual invocations, including global setup and teardown, are recorded as
    /// verdicts in the returned [`RunRecord`] rather than returned as errors.
    pub fn execute(self, watcher: &mut dyn TestWatcher) -> RunRecord {
        let Self {
            list,
            config,
            plan,
            rng,
            seed,
            stop_handle,
        } = self;

        watcher.run_started(&RunStartedInfo {
            plan_len: plan.len(),
            loop_count: config.loop_count,
            seed,
            random_execution: config.random_execution,
        });

        let mut state = RunState {
            executor: TestExecutor::new(list.setup_file()),
            cx: TestContext::default(),
            rng,
            record: RunRecord::new(seed, config.loop_count),
            stop_handle,
            loop_count: config.loop_count,
            random_execution: config.random_execution,
            stop_on_first_failure: config.stop_on_first_failure,
        };

        state.run_global(watcher, InvocationKind::GlobalSetup);
        if let ControlFlow::Break(reason) = state.run_plan(watcher, &plan) {
            match &reason {
                StopReason::Interrupted => info!("run interrupted, skipping remaining tests"),
                StopReason::FirstFailure { display_name } => {
                    info!("{display_name} failed, skipping remaining tests")
                }
            }
            state.record.set_stop_reason(reason);
        }
        // Global teardown is attempted regardless of how the plan ended.
        state.run_global(watcher, InvocationKind::GlobalTeardown);

        let record = state.record;
        watcher.run_finished(&record);
        record
    }
}

/// Mutable state for the duration of a run.
pub(super) struct RunState<'a> {
    pub(super) executor: TestExecutor<'a>,
    pub(super) cx: TestContext,
    pub(super) rng: StdRng,
    pub(super) record: RunRecord,
    pub(super) stop_handle: StopHandle,
    pub(super) loop_count: LoopCount,
    pub(super) random_execution: bool,
    pub(super) stop_on_first_failure: bool,
}

impl<'a> RunState<'a> {
    fn run_plan(
        &mut self,
        watcher: &mut dyn TestWatcher,
        plan: &ExecutionPlan<'a>,
    ) -> ControlFlow<StopReason> {
        for loop_index in 1..=self.loop_count.get() {
            if self.loop_count.is_repeated() {
                debug!("starting loop {loop_index} of {}", self.loop_count);
            }
            for entry in plan.entries() {
                if self.stop_handle.is_requested() {
                    return ControlFlow::Break(StopReason::Interrupted);
                }
                let flow = match entry.descriptor.parameterization() {
                    Some(parameterization) => {
                        self.run_parameterized(watcher, entry, parameterization, loop_index)
                    }
                    None => self.run_single(watcher, entry.descriptor, loop_index),
                };
                if let ControlFlow::Break(reason) = flow {
                    return ControlFlow::Break(reason);
                }
            }
        }
        ControlFlow::Continue(())
    }

    fn run_single(
        &mut self,
        watcher: &mut dyn TestWatcher,
        descriptor: &'a TestDescriptor,
        loop_index: usize,
    ) -> ControlFlow<StopReason> {
        let display_name =
            format_display_name(descriptor.name(), None, loop_index, self.loop_count);
        let skip = self.executor.skip_reason(descriptor);
        let outcome = self.executor.run_invocation(
            &mut self.cx,
            watcher,
            &Invocation {
                descriptor,
                set: None,
                display_name: &display_name,
                loop_index,
            },
            skip.as_deref(),
        );
        self.record_test(descriptor, None, loop_index, display_name.clone(), &outcome);
        self.check_stop(display_name, &outcome)
    }

    fn run_global(&mut self, watcher: &mut dyn TestWatcher, kind: InvocationKind) {
        let Some(outcome) = self.executor.run_global(&mut self.cx, watcher, kind) else {
            return;
        };
        let name = match kind {
            InvocationKind::GlobalSetup => super::GLOBAL_SETUP_NAME,
            _ => super::GLOBAL_TEARDOWN_NAME,
        };

        if let Some(failure) = outcome.failure() {
            warn!("{failure}");
            if kind == InvocationKind::GlobalSetup {
                self.executor.set_global_setup_failure(failure);
                self.record.set_global_setup_failed();
            }
        }
        self.record.add_invocation(
            name.to_owned(),
            RecordedInvocation {
                kind,
                test_name: name.to_owned(),
                set_suffix: None,
                loop_index: 1,
                verdict: outcome.verdict(),
            },
        );
    }

    pub(super) fn record_test(
        &mut self,
        descriptor: &TestDescriptor,
        set: Option<&ParameterSet>,
        loop_index: usize,
        display_name: String,
        outcome: &ExecutionOutcome,
    ) {
        self.record.add_invocation(
            display_name,
            RecordedInvocation {
                kind: InvocationKind::Test,
                test_name: descriptor.name().to_owned(),
                set_suffix: set.map(|set| set.suffix().into_owned()),
                loop_index,
                verdict: outcome.verdict(),
            },
        );
    }

    /// Decides whether the run continues after an invocation.
    pub(super) fn check_stop(
        &self,
        display_name: String,
        outcome: &ExecutionOutcome,
    ) -> ControlFlow<StopReason> {
        if self.stop_on_first_failure && is_real_failure(outcome) {
            return ControlFlow::Break(StopReason::FirstFailure { display_name });
        }
        if self.stop_handle.is_requested() {
            return ControlFlow::Break(StopReason::Interrupted);
        }
        ControlFlow::Continue(())
    }
}

/// Returns true if `outcome` is a failure of the invocation itself.
///
/// Failures synthesized because global setup failed don't count: every test still has to be
/// reported.
pub(super) fn is_real_failure(outcome: &ExecutionOutcome) -> bool {
    outcome
        .failure()
        .is_some_and(|failure| !failure.is_global_setup_gate())
}

/// Returns the display name of an invocation: `name`, or `name[suffix]` for a parameter set,
/// followed by ` (loop N)` if the plan is repeated.
pub(super) fn format_display_name(
    test_name: &str,
    set: Option<&ParameterSet>,
    loop_index: usize,
    loop_count: LoopCount,
) -> String {
    let mut name = match set {
        Some(set) => set.display_name(test_name),
        None => test_name.to_owned(),
    };
    if loop_count.is_repeated() {
        swrite!(name, " (loop {loop_index})");
    }
    name
}
