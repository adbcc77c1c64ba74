// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatching the parameter sets of a parameterized test.

use super::{
    TestFailure,
    executor::Invocation,
    imp::{RunState, format_display_name, is_real_failure},
};
use crate::{
    list::{ParameterSet, Parameterization, TestDescriptor},
    plan::PlanEntry,
    reporter::TestWatcher,
    runner::StopReason,
};
use contest_metadata::Verdict;
use rand::seq::SliceRandom;
use std::ops::ControlFlow;
use tracing::{debug, warn};

impl<'a> RunState<'a> {
    /// Runs every active set of a parameterized test, then reports the aggregate verdict.
    ///
    /// The skip condition is evaluated once for the whole group, before the set selection is
    /// consulted. A skipped group reports every selected active set as skipped.
    pub(super) fn run_parameterized(
        &mut self,
        watcher: &mut dyn TestWatcher,
        entry: &PlanEntry<'a>,
        parameterization: &'a Parameterization,
        loop_index: usize,
    ) -> ControlFlow<StopReason> {
        let descriptor = entry.descriptor;
        let options = parameterization.options();

        let mut sets: Vec<&ParameterSet> = parameterization.active_sets().collect();
        if options.random_order || self.random_execution {
            sets.shuffle(&mut self.rng);
        }

        let skip = self.executor.skip_reason(descriptor);
        let mut verdicts = Vec::with_capacity(sets.len());
        let mut flow = ControlFlow::Continue(());

        for set in sets {
            if !entry.sets.contains(set.suffix().as_ref()) {
                debug!(
                    "{}: not in the selection, not running",
                    set.display_name(descriptor.name())
                );
                continue;
            }

            let display_name =
                format_display_name(descriptor.name(), Some(set), loop_index, self.loop_count);
            let outcome = self.executor.run_invocation(
                &mut self.cx,
                watcher,
                &Invocation {
                    descriptor,
                    set: Some(set),
                    display_name: &display_name,
                    loop_index,
                },
                skip.as_deref(),
            );
            self.record_test(
                descriptor,
                Some(set),
                loop_index,
                display_name.clone(),
                &outcome,
            );
            verdicts.push(outcome.verdict());

            if let ControlFlow::Break(reason) = self.check_stop(display_name, &outcome) {
                flow = ControlFlow::Break(reason);
                break;
            }
            if options.stop_on_first_failure && is_real_failure(&outcome) {
                debug!("{}: set failed, not running remaining sets", descriptor.name());
                break;
            }
        }

        self.finish_group(watcher, descriptor, loop_index, &verdicts);
        flow
    }

    fn finish_group(
        &mut self,
        watcher: &mut dyn TestWatcher,
        descriptor: &TestDescriptor,
        loop_index: usize,
        verdicts: &[Verdict],
    ) {
        if verdicts.is_empty() {
            return;
        }

        let name = format_display_name(descriptor.name(), None, loop_index, self.loop_count);
        let verdict = Verdict::aggregate(verdicts.iter().copied());
        let failure = match verdict {
            Verdict::Fail => Some(TestFailure::ParameterizedGroup {
                failed: verdicts.iter().filter(|v| v.is_failure()).count(),
                total: verdicts.len(),
            }),
            Verdict::Inconclusive => {
                let inconclusive = verdicts
                    .iter()
                    .filter(|v| **v == Verdict::Inconclusive)
                    .count();
                warn!(
                    "{name}: {inconclusive} of {} parameter sets inconclusive",
                    verdicts.len()
                );
                None
            }
            _ => None,
        };

        debug!("{name}: aggregate verdict {verdict}");
        watcher.group_finished(&name, verdict, failure.as_ref());
        self.record.add_group(name, verdict);
    }
}
