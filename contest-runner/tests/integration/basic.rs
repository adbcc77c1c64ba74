// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use color_eyre::eyre::Result;
use contest_metadata::{ContestExitCode, InvocationKind, Verdict};
use contest_runner::{
    config::{LoopCount, RunConfig},
    list::{ParameterizedOptions, SetupFile, TestDescriptor, TestList, TestSuite},
    reporter::RecordedEvent,
    runner::{GLOBAL_SETUP_NAME, GLOBAL_TEARDOWN_NAME, StopReason},
    signal::StopHandle,
};
use fixture_data::bench_tests::{EXPECTED_TESTS, PRIORITY_ORDER};
use pretty_assertions::assert_eq;
use serde_json::json;

fn expanded_priority_order() -> Vec<String> {
    PRIORITY_ORDER
        .iter()
        .flat_map(|name| {
            let fixture = EXPECTED_TESTS.get(*name).expect("priority order names fixtures");
            if fixture.sets.is_empty() {
                vec![(*name).to_owned()]
            } else {
                fixture
                    .sets
                    .iter()
                    .map(|set| format!("{name}[{}]", set.suffix))
                    .collect()
            }
        })
        .collect()
}

#[test]
fn test_run_bench() -> Result<()> {
    let calls = CallLog::default();
    let list = bench_list(&calls);
    let (record, watcher) = run(&list, RunConfig::default());

    check_bench_verdicts(&record);
    assert_eq!(record.exit_code(), ContestExitCode::TEST_FAILURE);
    assert_eq!(record.stats().finished_count, bench_invocation_count());
    assert_eq!(record.stats().failed, expected_failures());
    assert_eq!(record.stats().skipped, 1);
    assert!(record.stop_reason().is_none());
    assert!(!record.global_setup_failed());

    // The bench setup file has no global functions, so there are no pseudo-tests.
    assert_eq!(record.verdict(GLOBAL_SETUP_NAME), None);
    assert_eq!(record.verdict(GLOBAL_TEARDOWN_NAME), None);

    assert_eq!(watcher.started_names(), expanded_priority_order());
    let expected_bodies: Vec<_> = expanded_priority_order()
        .into_iter()
        .filter(|name| name != "test_eeprom")
        .collect();
    assert_eq!(calls.bodies(), expected_bodies);

    Ok(())
}

#[test]
fn test_teardown_always_runs() {
    let calls = CallLog::default();
    let list = bench_list(&calls);
    run(&list, RunConfig::default());

    for name in expanded_priority_order() {
        let expected = if name == "test_eeprom" { 0 } else { 1 };
        assert_eq!(calls.count(&format!("setup:{name}")), expected, "setup of {name}");
        assert_eq!(calls.count(&format!("teardown:{name}")), expected, "teardown of {name}");
    }

    let entries = calls.entries();
    let flash = entries
        .iter()
        .position(|entry| entry == "body:test_flash_write")
        .expect("test_flash_write was called");
    assert_eq!(
        &entries[flash - 1..=flash + 1],
        ["setup:test_flash_write", "body:test_flash_write", "teardown:test_flash_write"],
    );
}

#[test]
fn test_accumulators_are_isolated() {
    let suite = TestSuite::new()
        .test(TestDescriptor::new("test_relay_open", |cx, _| {
            cx.expect(false, "relay did not open");
            cx.warn("contact bounce");
            Ok(())
        }))
        .test(TestDescriptor::new("test_relay_closed", |cx, _| {
            if cx.expectation_failures().is_empty() && cx.warnings().is_empty() {
                Ok(())
            } else {
                Err("state leaked from the previous test".into())
            }
        }));
    let list = TestList::new(suite, None).unwrap();
    let (record, _) = run(&list, RunConfig::default());

    assert_eq!(record.verdict("test_relay_open"), Some(Verdict::Fail));
    assert_eq!(record.verdict("test_relay_closed"), Some(Verdict::Pass));
}

#[test]
fn test_global_setup_failure() {
    let calls = CallLog::default();
    let skip_calls = calls.clone();
    let teardown_calls = calls.clone();

    let suite = TestSuite::new()
        .test(TestDescriptor::new("test_power_on", logging_body(&calls, "test_power_on")))
        .test(TestDescriptor::new("test_can_bus", logging_body(&calls, "test_can_bus")))
        .test(
            TestDescriptor::new("test_eeprom", logging_body(&calls, "test_eeprom")).skip_when(
                move || {
                    skip_calls.push("skip-condition");
                    true
                },
                "EEPROM programmer not connected",
            ),
        )
        .test(
            TestDescriptor::new("test_baudrate", logging_body(&calls, "test_baudrate"))
                .parameterized([json!(9600), json!(115200)], ParameterizedOptions::default()),
        )
        .setup_file(
            SetupFile::new("bench")
                .global_setup(|_| Err("bench power supply offline".into()))
                .global_teardown(move |_| {
                    teardown_calls.push("global-teardown");
                    Ok(())
                }),
        );
    let list = TestList::new(suite, None).unwrap();
    let (record, watcher) = run(&list, RunConfig::default());

    assert!(record.global_setup_failed());
    assert_eq!(record.verdict(GLOBAL_SETUP_NAME), Some(Verdict::Fail));
    assert_eq!(record.verdict(GLOBAL_TEARDOWN_NAME), Some(Verdict::Pass));
    for name in [
        "test_power_on",
        "test_can_bus",
        "test_eeprom",
        "test_baudrate[0]",
        "test_baudrate[1]",
    ] {
        assert_eq!(record.verdict(name), Some(Verdict::Fail), "verdict for {name}");
    }
    assert_eq!(
        record.group_verdicts().get("test_baudrate"),
        Some(&Verdict::Fail)
    );

    // No body ran, the deferred skip condition was never evaluated, and global teardown still
    // ran.
    assert_eq!(calls.entries(), ["global-teardown"]);
    assert_eq!(record.exit_code(), ContestExitCode::TEST_FAILURE);

    let gated = watcher
        .events()
        .iter()
        .filter(|event| {
            matches!(
                event,
                RecordedEvent::Failed { message }
                    if message.contains("was not run because global setup failed")
                        && message.contains("bench power supply offline")
            )
        })
        .count();
    assert_eq!(gated, 5);

    let kinds: Vec<_> = record
        .invocations()
        .iter()
        .map(|invocation| invocation.kind)
        .collect();
    assert_eq!(kinds.first(), Some(&InvocationKind::GlobalSetup));
    assert_eq!(kinds.last(), Some(&InvocationKind::GlobalTeardown));
}

#[test]
fn test_loop_count() {
    let calls = CallLog::default();
    let list = bench_list(&calls);
    let mut config = RunConfig::default();
    config.loop_count = LoopCount::new(3);
    let (record, _) = run(&list, config);

    assert_eq!(record.invocations().len(), 3 * bench_invocation_count());
    assert_eq!(record.stats().finished_count, 3 * bench_invocation_count());
    for loop_index in 1..=3 {
        for name in ["test_power_on", "test_baudrate[57600]"] {
            let display_name = format!("{name} (loop {loop_index})");
            assert_eq!(
                calls.count(&format!("body:{display_name}")),
                1,
                "{display_name} was called once"
            );
        }
        assert_eq!(
            record.verdict(&format!("test_flash_write (loop {loop_index})")),
            Some(Verdict::Fail)
        );
        assert_eq!(
            record
                .group_verdicts()
                .get(&format!("test_supply_rail (loop {loop_index})")),
            Some(&Verdict::Inconclusive)
        );
    }
    assert_eq!(record.verdict("test_power_on"), None);

    let loop_indexes: Vec<_> = record
        .invocations()
        .iter()
        .filter(|invocation| invocation.test_name == "test_can_bus")
        .map(|invocation| invocation.loop_index)
        .collect();
    assert_eq!(loop_indexes, [1, 2, 3]);
}

#[test]
fn test_stop_on_first_failure() {
    let calls = CallLog::default();
    let list = bench_list(&calls);
    let mut config = RunConfig::default();
    config.stop_on_first_failure = true;
    let (record, _) = run(&list, config);

    assert_eq!(
        record.stop_reason(),
        Some(&StopReason::FirstFailure {
            display_name: "test_flash_write".to_owned()
        })
    );
    assert_eq!(
        calls.bodies(),
        ["test_power_on", "test_can_bus", "test_flash_write"]
    );
    assert_eq!(calls.count("teardown:test_flash_write"), 1);
    assert_eq!(record.verdict("test_voltage_check"), None);
    assert_eq!(record.exit_code(), ContestExitCode::TEST_FAILURE);
}

#[test]
fn test_interactive_stop() {
    let calls = CallLog::default();
    let stop_handle = StopHandle::new();

    let requester = stop_handle.clone();
    let body_calls = calls.clone();
    let teardown_calls = calls.clone();
    let suite = TestSuite::new()
        .test(TestDescriptor::new("test_power_on", move |_, _| {
            body_calls.push("body:test_power_on");
            requester.request_stop();
            Ok(())
        }))
        .test(TestDescriptor::new("test_can_bus", |_, _| {
            Err("should not run".into())
        }))
        .setup_file(SetupFile::new("bench").global_teardown(move |_| {
            teardown_calls.push("global-teardown");
            Ok(())
        }));
    let list = TestList::new(suite, None).unwrap();
    let (record, _) = run_with_stop(&list, RunConfig::default(), stop_handle);

    assert_eq!(record.stop_reason(), Some(&StopReason::Interrupted));
    assert_eq!(record.verdict("test_power_on"), Some(Verdict::Pass));
    assert_eq!(record.verdict("test_can_bus"), None);
    assert_eq!(record.verdict(GLOBAL_TEARDOWN_NAME), Some(Verdict::Pass));
    assert_eq!(calls.entries(), ["body:test_power_on", "global-teardown"]);
    assert_eq!(record.exit_code(), ContestExitCode::OK);
}

#[test]
fn test_random_order_is_reproducible() {
    let run_seeded = |seed| {
        let calls = CallLog::default();
        let list = bench_list(&calls);
        let mut config = RunConfig::default();
        config.random_execution = true;
        config.seed = Some(seed);
        let (record, watcher) = run(&list, config);
        assert_eq!(record.seed(), seed);
        check_bench_verdicts(&record);
        watcher
            .started_names()
            .into_iter()
            .map(ToOwned::to_owned)
            .collect::<Vec<_>>()
    };

    let first = run_seeded(0x5eed);
    assert_eq!(first, run_seeded(0x5eed));

    let mut sorted = first.clone();
    sorted.sort();
    let mut expected = expanded_priority_order();
    expected.sort();
    assert_eq!(sorted, expected, "random order is a permutation of the plan");
}

#[test]
fn test_execution_record_seed() {
    let calls = CallLog::default();
    let list = bench_list(&calls);

    let (record, _) = run(&list, RunConfig::default());
    assert_eq!(record.to_execution_record("default", false).seed, None);

    let mut config = RunConfig::default();
    config.random_execution = true;
    config.seed = Some(17);
    let (record, _) = run(&list, config);
    let execution_record = record.to_execution_record("default", true);
    assert_eq!(execution_record.seed, Some(17));
    assert_eq!(execution_record.profile_name, "default");
}
