// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{RunStartedInfo, TestInstance, TestWatcher};
use crate::runner::{RunRecord, TestFailure};
use contest_metadata::{InvocationKind, Verdict};

/// A single notification received by a [`RecordingWatcher`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RecordedEvent {
    /// [`TestWatcher::run_started`].
    RunStarted {
        /// The number of tests in the plan.
        plan_len: usize,
    },

    /// [`TestWatcher::test_started`].
    Started {
        /// The display name of the invocation.
        display_name: String,

        /// The kind of invocation.
        kind: InvocationKind,
    },

    /// [`TestWatcher::test_skipped`].
    Skipped {
        /// The skip reason.
        reason: String,
    },

    /// [`TestWatcher::test_succeeded`].
    Succeeded,

    /// [`TestWatcher::test_failed`].
    Failed {
        /// The rendered failure.
        message: String,
    },

    /// [`TestWatcher::test_inconclusive`].
    Inconclusive {
        /// The recorded warnings.
        warnings: Vec<String>,
    },

    /// [`TestWatcher::test_finished`].
    Finished,

    /// [`TestWatcher::group_finished`].
    GroupFinished {
        /// The display name of the parameterized test.
        name: String,

        /// The aggregate verdict.
        verdict: Verdict,
    },

    /// [`TestWatcher::run_finished`].
    RunFinished {
        /// The exit code of the run.
        exit_code: i32,
    },
}

/// A watcher that keeps every notification as a [`RecordedEvent`].
#[derive(Clone, Debug, Default)]
pub struct RecordingWatcher {
    events: Vec<RecordedEvent>,
}

impl RecordingWatcher {
    /// Creates a new, empty watcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the events received so far.
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Returns the display names of all started invocations, in order.
    pub fn started_names(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RecordedEvent::Started { display_name, .. } => Some(display_name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Consumes the watcher, returning its events.
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }
}

impl TestWatcher for RecordingWatcher {
    fn run_started(&mut self, info: &RunStartedInfo) {
        self.events.push(RecordedEvent::RunStarted {
            plan_len: info.plan_len,
        });
    }

    fn test_started(&mut self, instance: &TestInstance<'_>) {
        self.events.push(RecordedEvent::Started {
            display_name: instance.display_name.to_owned(),
            kind: instance.kind,
        });
    }

    fn test_skipped(&mut self, reason: &str) {
        self.events.push(RecordedEvent::Skipped {
            reason: reason.to_owned(),
        });
    }

    fn test_succeeded(&mut self) {
        self.events.push(RecordedEvent::Succeeded);
    }

    fn test_failed(&mut self, failure: &TestFailure) {
        self.events.push(RecordedEvent::Failed {
            message: failure.to_string(),
        });
    }

    fn test_inconclusive(&mut self, warnings: &[String]) {
        self.events.push(RecordedEvent::Inconclusive {
            warnings: warnings.to_vec(),
        });
    }

    fn test_finished(&mut self) {
        self.events.push(RecordedEvent::Finished);
    }

    fn group_finished(&mut self, name: &str, verdict: Verdict, _failure: Option<&TestFailure>) {
        self.events.push(RecordedEvent::GroupFinished {
            name: name.to_owned(),
            verdict,
        });
    }

    fn run_finished(&mut self, record: &RunRecord) {
        self.events.push(RecordedEvent::RunFinished {
            exit_code: record.exit_code(),
        });
    }
}
