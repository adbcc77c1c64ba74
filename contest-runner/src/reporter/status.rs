// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{RunStartedInfo, TestInstance, TestWatcher};
use crate::runner::{RunRecord, TestFailure};
use contest_metadata::Verdict;
use std::sync::{Arc, PoisonError, RwLock};

/// The state of a run, as seen by a status poller.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RunStatus {
    /// The run hasn't started.
    #[default]
    Idle,

    /// An invocation is running.
    Running,

    /// Between invocations.
    Waiting,

    /// The run has finished.
    Finished,
}

/// An immutable snapshot of a run's progress.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StatusSnapshot {
    /// The display name of the running invocation, if any.
    pub current_test: Option<String>,

    /// The state of the run.
    pub state: RunStatus,

    /// The verdict of the most recently finished invocation.
    pub last_verdict: Option<Verdict>,

    /// The number of finished invocations, including global setup and teardown.
    pub finished: usize,

    /// The number of failed invocations.
    pub failed: usize,

    /// The exit code, once the run has finished.
    pub exit_code: Option<i32>,
}

/// A watcher that publishes [`StatusSnapshot`]s for other threads to read.
///
/// The runner itself is single-threaded; this is the one piece of state shared with another
/// thread. Readers obtain a [`StatusHandle`] through [`handle`](Self::handle) and only ever see
/// complete snapshots.
#[derive(Debug, Default)]
pub struct StatusPublisher {
    working: StatusSnapshot,
    shared: Arc<RwLock<StatusSnapshot>>,
}

impl StatusPublisher {
    /// Creates a new publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle that can be sent to another thread.
    pub fn handle(&self) -> StatusHandle {
        StatusHandle {
            shared: self.shared.clone(),
        }
    }

    fn publish(&self) {
        let mut shared = self.shared.write().unwrap_or_else(PoisonError::into_inner);
        *shared = self.working.clone();
    }

    fn finish_invocation(&mut self, verdict: Verdict) {
        self.working.finished += 1;
        if verdict.is_failure() {
            self.working.failed += 1;
        }
        self.working.last_verdict = Some(verdict);
        self.publish();
    }
}

impl TestWatcher for StatusPublisher {
    fn run_started(&mut self, _info: &RunStartedInfo) {
        self.working = StatusSnapshot {
            state: RunStatus::Waiting,
            ..Default::default()
        };
        self.publish();
    }

    fn test_started(&mut self, instance: &TestInstance<'_>) {
        self.working.current_test = Some(instance.display_name.to_owned());
        self.working.state = RunStatus::Running;
        self.publish();
    }

    fn test_skipped(&mut self, _reason: &str) {
        self.finish_invocation(Verdict::Skip);
    }

    fn test_succeeded(&mut self) {
        self.finish_invocation(Verdict::Pass);
    }

    fn test_failed(&mut self, _failure: &TestFailure) {
        self.finish_invocation(Verdict::Fail);
    }

    fn test_inconclusive(&mut self, _warnings: &[String]) {
        self.finish_invocation(Verdict::Inconclusive);
    }

    fn test_finished(&mut self) {
        self.working.current_test = None;
        self.working.state = RunStatus::Waiting;
        self.publish();
    }

    fn run_finished(&mut self, record: &RunRecord) {
        self.working.state = RunStatus::Finished;
        self.working.exit_code = Some(record.exit_code());
        self.publish();
    }
}

/// A cloneable, thread-safe handle to the latest [`StatusSnapshot`].
#[derive(Clone, Debug)]
pub struct StatusHandle {
    shared: Arc<RwLock<StatusSnapshot>>,
}

impl StatusHandle {
    /// Returns the latest published snapshot.
    pub fn snapshot(&self) -> StatusSnapshot {
        self.shared
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
