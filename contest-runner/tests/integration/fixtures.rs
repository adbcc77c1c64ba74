// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use contest_metadata::Verdict;
use contest_runner::{
    config::{RunConfig, TestPriority},
    list::{
        ParameterSet, ParameterizedOptions, SetupFile, TestArgs, TestDescriptor, TestList,
        TestResult, TestSuite,
    },
    reporter::RecordingWatcher,
    runner::{RunRecord, TestContext, TestRunnerBuilder},
    signal::StopHandle,
};
use fixture_data::{bench_tests::EXPECTED_TESTS, models::SetFixture};
use serde_json::json;
use std::{cell::RefCell, rc::Rc};

/// A shared log of calls made by fixture functions and test bodies, in order.
#[derive(Clone, Debug, Default)]
pub(crate) struct CallLog(Rc<RefCell<Vec<String>>>);

impl CallLog {
    pub(crate) fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    /// Returns the bodies that were called, by display name.
    pub(crate) fn bodies(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|entry| entry.strip_prefix("body:"))
            .map(ToOwned::to_owned)
            .collect()
    }

    pub(crate) fn count(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|e| *e == entry).count()
    }
}

/// Returns the "bench" suite, whose expected verdicts are in [`EXPECTED_TESTS`].
///
/// Registration order deliberately differs from priority order.
pub(crate) fn bench_suite(calls: &CallLog) -> TestSuite {
    TestSuite::new()
        .test(
            logged_test(calls, "test_can_bus", |_| Ok(()))
                .tags(["smoke", "can"])
                .requirements(["REQ-12"]),
        )
        .test(logged_test(calls, "test_boot_time", |_| Ok(())).priority(TestPriority::Low))
        .test(
            logged_test(calls, "test_power_on", |_| Ok(()))
                .priority(TestPriority::High)
                .tag("smoke"),
        )
        .test(logged_test(calls, "test_flash_write", |_| {
            Err("write verify mismatch at 0x0800".into())
        }))
        .test(
            logged_test(calls, "test_voltage_check", |cx| {
                cx.expect(false, "rail below 3.0V");
                Ok(())
            })
            .tag("power")
            .automation_ids(["AUTO-7"]),
        )
        .test(logged_test(calls, "test_temperature", |cx| {
            cx.warn("sensor not calibrated");
            Ok(())
        }))
        .test(
            logged_test(calls, "test_eeprom", |_| Ok(()))
                .skip_if(true, "EEPROM programmer not connected"),
        )
        .test(parameterized_test(calls, "test_baudrate", |cx, rate| {
            cx.expect(rate != "57600", format!("no sync at {rate} baud"));
            Ok(())
        }))
        .test(parameterized_test(calls, "test_supply_rail", |cx, rail| {
            if rail == "5v" {
                cx.warn("5v rail reading noisy");
            }
            Ok(())
        }))
        .setup_file(bench_setup_file(calls))
}

fn bench_setup_file(calls: &CallLog) -> SetupFile {
    let setup_calls = calls.clone();
    let teardown_calls = calls.clone();
    SetupFile::new("bench")
        .setup(move |cx| {
            setup_calls.push(format!("setup:{}", cx.display_name()));
            Ok(())
        })
        .teardown(move |cx| {
            teardown_calls.push(format!("teardown:{}", cx.display_name()));
            Ok(())
        })
}

/// Returns a passing test body that logs its display name.
pub(crate) fn logging_body(
    calls: &CallLog,
    name: &'static str,
) -> impl Fn(&mut TestContext, TestArgs<'_>) -> TestResult + 'static {
    let calls = calls.clone();
    move |_, _| {
        calls.push(format!("body:{name}"));
        Ok(())
    }
}

/// Returns a passing test body that logs the display name of each invocation.
pub(crate) fn display_name_body(
    calls: &CallLog,
) -> impl Fn(&mut TestContext, TestArgs<'_>) -> TestResult + 'static {
    let calls = calls.clone();
    move |cx, _| {
        calls.push(format!("body:{}", cx.display_name()));
        Ok(())
    }
}

fn logged_test(
    calls: &CallLog,
    name: &str,
    body: impl Fn(&mut TestContext) -> TestResult + 'static,
) -> TestDescriptor {
    let calls = calls.clone();
    TestDescriptor::new(name, move |cx, _| {
        calls.push(format!("body:{}", cx.display_name()));
        body(cx)
    })
}

/// A test parameterized over the sets in the fixture data, with each set's suffix as its value.
fn parameterized_test(
    calls: &CallLog,
    name: &str,
    body: impl Fn(&mut TestContext, String) -> TestResult + 'static,
) -> TestDescriptor {
    let calls = calls.clone();
    let fixture = EXPECTED_TESTS
        .get(name)
        .unwrap_or_else(|| panic!("{name} is a fixture"));
    TestDescriptor::new(name, move |cx, args| {
        calls.push(format!("body:{}", cx.display_name()));
        let value = args.single()?;
        let value = value
            .as_str()
            .ok_or_else(|| format!("expected a string, got {value}"))?;
        body(cx, value.to_owned())
    })
    .parameterized_sets(sets(fixture.sets), ParameterizedOptions::default())
}

fn sets(fixtures: &[SetFixture]) -> Vec<ParameterSet> {
    fixtures
        .iter()
        .enumerate()
        .map(|(index, set)| ParameterSet::new(index, json!(set.suffix)).with_label(set.suffix))
        .collect()
}

pub(crate) fn bench_list(calls: &CallLog) -> TestList {
    TestList::new(bench_suite(calls), None).expect("bench suite is valid")
}

pub(crate) fn run(list: &TestList, config: RunConfig) -> (RunRecord, RecordingWatcher) {
    run_with_stop(list, config, StopHandle::new())
}

pub(crate) fn run_with_stop(
    list: &TestList,
    config: RunConfig,
    stop_handle: StopHandle,
) -> (RunRecord, RecordingWatcher) {
    let mut builder = TestRunnerBuilder::new(config);
    builder.set_stop_handle(stop_handle);
    let mut watcher = RecordingWatcher::new();
    let record = builder.build(list).execute(&mut watcher);
    (record, watcher)
}

/// Checks the verdicts of a single run of the whole bench suite against the fixture data.
pub(crate) fn check_bench_verdicts(record: &RunRecord) {
    for fixture in EXPECTED_TESTS.iter() {
        if fixture.sets.is_empty() {
            assert_eq!(
                record.verdict(fixture.name),
                Some(fixture.verdict),
                "verdict for {}",
                fixture.name
            );
            continue;
        }

        for set in fixture.sets {
            let display_name = format!("{}[{}]", fixture.name, set.suffix);
            assert_eq!(
                record.verdict(&display_name),
                Some(set.verdict),
                "verdict for {display_name}"
            );
        }
        assert_eq!(
            record.group_verdicts().get(fixture.name).copied(),
            Some(fixture.verdict),
            "group verdict for {}",
            fixture.name
        );
    }
}

/// Returns the number of expected test invocations for one loop of the bench suite.
pub(crate) fn bench_invocation_count() -> usize {
    EXPECTED_TESTS
        .iter()
        .map(|fixture| fixture.sets.len().max(1))
        .sum()
}

pub(crate) fn expected_failures() -> usize {
    EXPECTED_TESTS
        .iter()
        .flat_map(|fixture| {
            if fixture.sets.is_empty() {
                vec![fixture.verdict]
            } else {
                fixture.sets.iter().map(|set| set.verdict).collect()
            }
        })
        .filter(|verdict| *verdict == Verdict::Fail)
        .count()
}
