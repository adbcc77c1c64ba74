// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::LoopCount;
use crate::test_filter::TagFilter;

/// The resolved configuration for a single run.
///
/// A `RunConfig` is usually obtained from a [`ContestConfig`](super::ContestConfig) profile, with
/// command-line [overrides](RunConfigOverrides) applied on top. It can also be constructed
/// directly through [`Default`] and field assignment.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct RunConfig {
    /// The profile this configuration was read from.
    pub profile_name: String,

    /// How many times the whole plan is repeated.
    pub loop_count: LoopCount,

    /// Whether to order the plan (and parameter sets) randomly instead of by priority.
    pub random_execution: bool,

    /// The seed for random ordering. If unset, a seed is drawn at the start of the run.
    pub seed: Option<u64>,

    /// Whether to run the complement of the selection.
    pub reverse_selection: bool,

    /// Whether the first failing invocation aborts the remaining plan.
    pub stop_on_first_failure: bool,

    /// Tag filters: every filter must match.
    pub filters: Vec<TagFilter>,

    /// Explicitly selected tests, as `name` or `name[set]`. Empty selects every test.
    pub selected_tests: Vec<String>,

    /// The setup file used to resolve setup and teardown functions. If unset, the suite's
    /// default setup file is used.
    pub setup_file: Option<String>,
}

impl RunConfig {
    /// The name of the profile used when none is specified.
    pub const DEFAULT_PROFILE: &'static str = "default";

    /// Applies command-line overrides on top of this configuration.
    pub fn apply_overrides(&mut self, overrides: RunConfigOverrides) {
        let RunConfigOverrides {
            loop_count,
            random_execution,
            seed,
            reverse_selection,
            stop_on_first_failure,
            filters,
            selected_tests,
            setup_file,
        } = overrides;

        if let Some(loop_count) = loop_count {
            self.loop_count = loop_count;
        }
        if let Some(random_execution) = random_execution {
            self.random_execution = random_execution;
        }
        if seed.is_some() {
            self.seed = seed;
        }
        if let Some(reverse_selection) = reverse_selection {
            self.reverse_selection = reverse_selection;
        }
        if let Some(stop_on_first_failure) = stop_on_first_failure {
            self.stop_on_first_failure = stop_on_first_failure;
        }
        // Filters are additive: every filter must match anyway.
        self.filters.extend(filters);
        if let Some(selected_tests) = selected_tests {
            self.selected_tests = selected_tests;
        }
        if setup_file.is_some() {
            self.setup_file = setup_file;
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            profile_name: Self::DEFAULT_PROFILE.to_owned(),
            loop_count: LoopCount::ONCE,
            random_execution: false,
            seed: None,
            reverse_selection: false,
            stop_on_first_failure: false,
            filters: Vec::new(),
            selected_tests: Vec::new(),
            setup_file: None,
        }
    }
}

/// Overrides for a [`RunConfig`], typically from the command line.
///
/// `None` leaves the configured value unchanged.
#[derive(Clone, Debug, Default)]
pub struct RunConfigOverrides {
    /// Overrides the loop count.
    pub loop_count: Option<LoopCount>,

    /// Overrides random execution.
    pub random_execution: Option<bool>,

    /// Overrides the seed.
    pub seed: Option<u64>,

    /// Overrides reverse selection.
    pub reverse_selection: Option<bool>,

    /// Overrides stop-on-first-failure.
    pub stop_on_first_failure: Option<bool>,

    /// Additional filters, appended to the configured ones.
    pub filters: Vec<TagFilter>,

    /// Replaces the selected tests.
    pub selected_tests: Option<Vec<String>>,

    /// Overrides the setup file.
    pub setup_file: Option<String>,
}
