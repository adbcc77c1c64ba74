// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::config::LoopCount;
use chrono::Utc;
use contest_metadata::{
    ContestExitCode, ExecutionRecord, InvocationKind, RecordedInvocation, Verdict,
};
use indexmap::IndexMap;

/// The results of a finished run.
#[derive(Clone, Debug)]
pub struct RunRecord {
    verdicts: IndexMap<String, Verdict>,
    invocations: Vec<RecordedInvocation>,
    group_verdicts: IndexMap<String, Verdict>,
    stats: RunStats,
    seed: u64,
    loop_count: LoopCount,
    global_setup_failed: bool,
    stop_reason: Option<StopReason>,
}

impl RunRecord {
    pub(super) fn new(seed: u64, loop_count: LoopCount) -> Self {
        Self {
            verdicts: IndexMap::new(),
            invocations: Vec::new(),
            group_verdicts: IndexMap::new(),
            stats: RunStats::default(),
            seed,
            loop_count,
            global_setup_failed: false,
            stop_reason: None,
        }
    }

    pub(super) fn add_invocation(
        &mut self,
        display_name: String,
        invocation: RecordedInvocation,
    ) {
        if invocation.kind == InvocationKind::Test {
            self.stats.on_verdict(invocation.verdict);
        }
        self.verdicts.insert(display_name, invocation.verdict);
        self.invocations.push(invocation);
    }

    pub(super) fn add_group(&mut self, display_name: String, verdict: Verdict) {
        self.group_verdicts.insert(display_name, verdict);
    }

    pub(super) fn set_global_setup_failed(&mut self) {
        self.global_setup_failed = true;
    }

    pub(super) fn set_stop_reason(&mut self, reason: StopReason) {
        self.stop_reason = Some(reason);
    }

    /// Returns the verdict of every invocation by display name, in execution order.
    ///
    /// This includes the `global_setup` and `global_teardown` pseudo-tests if the setup file
    /// defines those functions.
    pub fn verdicts(&self) -> &IndexMap<String, Verdict> {
        &self.verdicts
    }

    /// Returns the verdict of the invocation with the given display name.
    pub fn verdict(&self, display_name: &str) -> Option<Verdict> {
        self.verdicts.get(display_name).copied()
    }

    /// Returns every invocation, in execution order.
    pub fn invocations(&self) -> &[RecordedInvocation] {
        &self.invocations
    }

    /// Returns the aggregate verdicts of parameterized tests, by display name without a set
    /// suffix.
    pub fn group_verdicts(&self) -> &IndexMap<String, Verdict> {
        &self.group_verdicts
    }

    /// Returns counters over test invocations. Global setup and teardown are not counted.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Returns the seed of the run's random number generator.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the loop count the run used.
    pub fn loop_count(&self) -> LoopCount {
        self.loop_count
    }

    /// Returns true if global setup failed.
    pub fn global_setup_failed(&self) -> bool {
        self.global_setup_failed
    }

    /// Returns why the run stopped before the end of the plan, if it did.
    pub fn stop_reason(&self) -> Option<&StopReason> {
        self.stop_reason.as_ref()
    }

    /// Returns the process exit code for this run.
    pub fn exit_code(&self) -> i32 {
        ContestExitCode::from_verdicts(self.verdicts.values().copied())
    }

    /// Converts this record into the serializable form used for replay.
    pub fn to_execution_record(&self, profile_name: &str, random_execution: bool) -> ExecutionRecord {
        ExecutionRecord {
            version: ExecutionRecord::CURRENT_VERSION,
            created_at: Utc::now(),
            profile_name: profile_name.to_owned(),
            seed: random_execution.then_some(self.seed),
            invocations: self.invocations.clone(),
        }
    }
}

/// Why a run stopped before the end of the plan.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StopReason {
    /// A stop was requested through a [`StopHandle`](crate::signal::StopHandle).
    Interrupted,

    /// An invocation failed and stop-on-first-failure is enabled.
    FirstFailure {
        /// The display name of the failing invocation.
        display_name: String,
    },
}

/// Counters over the test invocations of a run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunStats {
    /// The number of invocations that finished.
    pub finished_count: usize,

    /// The number of invocations that passed.
    pub passed: usize,

    /// The number of invocations that failed.
    pub failed: usize,

    /// The number of invocations that were inconclusive.
    pub inconclusive: usize,

    /// The number of invocations that were skipped.
    pub skipped: usize,
}

impl RunStats {
    /// Returns true if no invocation failed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn on_verdict(&mut self, verdict: Verdict) {
        self.finished_count += 1;
        match verdict {
            Verdict::Pass => self.passed += 1,
            Verdict::Fail => self.failed += 1,
            Verdict::Inconclusive => self.inconclusive += 1,
            Verdict::Skip => self.skipped += 1,
            Verdict::Unknown => {}
        }
    }
}
