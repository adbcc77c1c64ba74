// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::Verdict;
use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A record of a finished run, serialized to disk so that a later run can replay its selection.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExecutionRecord {
    /// Version of the record format.
    pub version: u32,

    /// When this record was created.
    pub created_at: DateTime<Utc>,

    /// The profile that was used for the run.
    pub profile_name: String,

    /// The seed used for random ordering, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Every invocation of the run, in execution order.
    pub invocations: Vec<RecordedInvocation>,
}

impl ExecutionRecord {
    /// The current version of the record format.
    pub const CURRENT_VERSION: u32 = 1;

    /// Returns the selection names of all tests whose recorded verdict is one of `verdicts`.
    ///
    /// Names carry a parameter-set suffix where applicable, so replaying a parameterized test
    /// only re-runs the sets that matched. Loop repetitions collapse into a single entry, and
    /// global setup and teardown are never selected.
    pub fn select(&self, verdicts: &[Verdict]) -> Vec<String> {
        let selected: IndexSet<String> = self
            .invocations
            .iter()
            .filter(|invocation| invocation.kind == InvocationKind::Test)
            .filter(|invocation| verdicts.contains(&invocation.verdict))
            .map(RecordedInvocation::selection_name)
            .collect();
        selected.into_iter().collect()
    }
}

/// A single invocation within an [`ExecutionRecord`].
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RecordedInvocation {
    /// What kind of unit this invocation ran.
    pub kind: InvocationKind,

    /// The base name of the test.
    pub test_name: String,

    /// The parameter-set suffix (without brackets), for parameterized tests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_suffix: Option<String>,

    /// The loop iteration (1-based) this invocation ran in.
    pub loop_index: usize,

    /// The verdict assigned to the invocation.
    pub verdict: Verdict,
}

impl RecordedInvocation {
    /// Returns the name used to select this invocation again: `name` or `name[suffix]`.
    pub fn selection_name(&self) -> String {
        match &self.set_suffix {
            Some(suffix) => format!("{}[{}]", self.test_name, suffix),
            None => self.test_name.clone(),
        }
    }
}

/// The kind of unit an invocation ran.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvocationKind {
    /// A regular test, or one parameter set of a parameterized test.
    Test,

    /// The global setup pseudo-test.
    GlobalSetup,

    /// The global teardown pseudo-test.
    GlobalTeardown,
}
