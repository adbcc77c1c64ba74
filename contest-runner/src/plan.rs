// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Building the ordered execution plan.

use crate::{
    list::{TestDescriptor, TestList},
    test_filter::{FilterMatch, SetSelection, TestFilter},
};
use rand::{rngs::StdRng, seq::SliceRandom};
use tracing::debug;

/// How an [`ExecutionPlan`] is ordered.
#[derive(Debug)]
pub enum PlanOrder<'r> {
    /// Highest priority first; ties keep discovery order.
    Priority,

    /// A uniform random permutation drawn from the given generator.
    Random(&'r mut StdRng),
}

/// An ordered sequence of tests to run.
#[derive(Clone, Debug)]
pub struct ExecutionPlan<'a> {
    entries: Vec<PlanEntry<'a>>,
}

impl<'a> ExecutionPlan<'a> {
    /// Builds a plan from the tests in `list` that match `filter`.
    pub fn build(list: &'a TestList, filter: &TestFilter, order: PlanOrder<'_>) -> Self {
        let mut entries: Vec<_> = list
            .iter()
            .filter_map(|descriptor| match filter.filter_match(descriptor) {
                FilterMatch::Matches { sets } => Some(PlanEntry { descriptor, sets }),
                FilterMatch::Mismatch { reason } => {
                    debug!("{}: {reason}", descriptor.name());
                    None
                }
            })
            .collect();

        match order {
            // sort_by_key is stable.
            PlanOrder::Priority => entries.sort_by_key(|entry| entry.descriptor.test_priority()),
            PlanOrder::Random(rng) => entries.shuffle(rng),
        }

        Self { entries }
    }

    /// Returns the entries in execution order.
    pub fn entries(&self) -> &[PlanEntry<'a>] {
        &self.entries
    }

    /// Returns the names of the planned tests, in execution order.
    pub fn names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.iter().map(|entry| entry.descriptor.name())
    }

    /// Returns the number of planned tests.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no tests are planned.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One test in an [`ExecutionPlan`].
#[derive(Clone, Debug)]
pub struct PlanEntry<'a> {
    /// The test to run.
    pub descriptor: &'a TestDescriptor,

    /// The parameter sets to run, if the test is parameterized.
    pub sets: SetSelection,
}
