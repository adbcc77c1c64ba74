// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use contest_metadata::Verdict;
use contest_runner::{
    config::RunConfig,
    list::{ParameterSet, ParameterizedOptions, SetupFile, TestDescriptor, TestList, TestSuite},
    reporter::RecordedEvent,
    runner::{RunRecord, StopReason},
    signal::StopHandle,
};
use pretty_assertions::assert_eq;
use serde_json::json;

/// Three sets with suffixes 0, 1 and 2, where set 1 is deselected.
fn sets_with_deselected() -> Vec<ParameterSet> {
    vec![
        ParameterSet::new(0, json!("low")),
        ParameterSet::new(1, json!("mid")).deselect(),
        ParameterSet::new(2, json!("high")),
    ]
}

fn verdicts(record: &RunRecord) -> Vec<(&str, Verdict)> {
    record
        .verdicts()
        .iter()
        .map(|(name, verdict)| (name.as_str(), *verdict))
        .collect()
}

#[test]
fn test_deselected_sets_are_not_attempted() {
    let calls = CallLog::default();
    let suite = TestSuite::new().test(
        TestDescriptor::new("test_gain", display_name_body(&calls))
            .parameterized_sets(sets_with_deselected(), ParameterizedOptions::default()),
    );
    let list = TestList::new(suite, None).unwrap();
    let (record, watcher) = run(&list, RunConfig::default());

    assert_eq!(calls.bodies(), ["test_gain[0]", "test_gain[2]"]);
    assert_eq!(watcher.started_names(), ["test_gain[0]", "test_gain[2]"]);
    assert_eq!(
        verdicts(&record),
        [("test_gain[0]", Verdict::Pass), ("test_gain[2]", Verdict::Pass)]
    );
    assert_eq!(record.group_verdicts().get("test_gain"), Some(&Verdict::Pass));
}

#[test]
fn test_descriptor_stop_on_first_failure() {
    let calls = CallLog::default();
    let body_calls = calls.clone();
    let suite = TestSuite::new()
        .test(
            TestDescriptor::new("test_gain", move |cx, _| {
                body_calls.push(format!("body:{}", cx.display_name()));
                Err("gain out of range".into())
            })
            .parameterized(
                [json!(1), json!(2), json!(4)],
                ParameterizedOptions {
                    stop_on_first_failure: true,
                    ..Default::default()
                },
            ),
        )
        .test(TestDescriptor::new("test_after", logging_body(&calls, "test_after")));
    let list = TestList::new(suite, None).unwrap();
    let (record, _) = run(&list, RunConfig::default());

    // The remaining sets are abandoned, but the rest of the plan runs.
    assert_eq!(calls.bodies(), ["test_gain[0]", "test_after"]);
    assert_eq!(record.verdict("test_gain[1]"), None);
    assert_eq!(record.group_verdicts().get("test_gain"), Some(&Verdict::Fail));
    assert_eq!(record.verdict("test_after"), Some(Verdict::Pass));
    assert_eq!(record.stop_reason(), None);
}

#[test]
fn test_skipped_group() {
    let calls = CallLog::default();
    let suite = TestSuite::new()
        .test(
            TestDescriptor::new("test_gain", display_name_body(&calls))
                .parameterized_sets(sets_with_deselected(), ParameterizedOptions::default())
                .skip_if(true, "amplifier not fitted"),
        )
        .setup_file(SetupFile::new("bench").setup({
            let calls = calls.clone();
            move |cx| {
                calls.push(format!("setup:{}", cx.display_name()));
                Ok(())
            }
        }));
    let list = TestList::new(suite, None).unwrap();
    let (record, watcher) = run(&list, RunConfig::default());

    assert_eq!(calls.entries(), Vec::<String>::new());
    assert_eq!(
        verdicts(&record),
        [("test_gain[0]", Verdict::Skip), ("test_gain[2]", Verdict::Skip)]
    );
    assert_eq!(record.group_verdicts().get("test_gain"), Some(&Verdict::Skip));

    let skipped = watcher
        .events()
        .iter()
        .filter(|event| {
            matches!(
                event,
                RecordedEvent::Skipped { reason } if reason == "amplifier not fitted"
            )
        })
        .count();
    assert_eq!(skipped, 2);
}

#[test]
fn test_interactive_stop_between_sets() {
    let calls = CallLog::default();
    let stop_handle = StopHandle::new();

    let requester = stop_handle.clone();
    let body_calls = calls.clone();
    let suite = TestSuite::new()
        .test(
            TestDescriptor::new("test_gain", move |cx, _| {
                body_calls.push(format!("body:{}", cx.display_name()));
                requester.request_stop();
                Ok(())
            })
            .parameterized([json!(1), json!(2), json!(4)], ParameterizedOptions::default()),
        )
        .test(TestDescriptor::new("test_after", logging_body(&calls, "test_after")));
    let list = TestList::new(suite, None).unwrap();
    let (record, _) = run_with_stop(&list, RunConfig::default(), stop_handle);

    assert_eq!(calls.bodies(), ["test_gain[0]"]);
    assert_eq!(record.stop_reason(), Some(&StopReason::Interrupted));
    assert_eq!(verdicts(&record), [("test_gain[0]", Verdict::Pass)]);
    // The sets that did run still get an aggregate.
    assert_eq!(record.group_verdicts().get("test_gain"), Some(&Verdict::Pass));
}

#[test]
fn test_set_random_order_is_reproducible() {
    let run_seeded = |seed| {
        let calls = CallLog::default();
        let suite = TestSuite::new().test(
            TestDescriptor::new("test_gain", display_name_body(&calls)).parameterized(
                (0..8).map(|gain| json!(gain)),
                ParameterizedOptions {
                    random_order: true,
                    ..Default::default()
                },
            ),
        );
        let list = TestList::new(suite, None).unwrap();
        let mut config = RunConfig::default();
        config.seed = Some(seed);
        let (record, _) = run(&list, config);
        assert_eq!(record.verdicts().len(), 8);
        calls.bodies()
    };

    let first = run_seeded(0xc0ffee);
    assert_eq!(first, run_seeded(0xc0ffee));

    let mut sorted = first;
    sorted.sort();
    let expected: Vec<_> = (0..8).map(|index| format!("test_gain[{index}]")).collect();
    assert_eq!(sorted, expected, "set order is a permutation of the sets");
}

#[test]
fn test_failure_messages_are_deterministic() {
    let failure_messages = || {
        let suite = TestSuite::new()
            .test(
                TestDescriptor::new("test_relay", |_, _| Err("contact welded".into()))
                    .custom_setup("open_relay")
                    .custom_teardown("close_relay"),
            )
            .test(
                TestDescriptor::new("test_dtc", |cx, _| {
                    cx.expect(false, "DTC P0A80 present");
                    cx.expect(false, "DTC U0100 present");
                    Ok(())
                }),
            )
            .test(TestDescriptor::new("test_can_bus", |_, _| Ok(())).custom_setup("open_relay"))
            .test(
                TestDescriptor::new("test_gain", |_, args| {
                    let gain = args.single()?;
                    Err(format!("gain {gain} out of range").into())
                })
                .parameterized([json!(1), json!(2)], ParameterizedOptions::default()),
            )
            .setup_file(
                SetupFile::new("bench")
                    .function("open_relay", |_| Err("relay driver not responding".into()))
                    .function("close_relay", |_| Err("relay stuck".into())),
            );
        let list = TestList::new(suite, None).unwrap();
        let (_, watcher) = run(&list, RunConfig::default());
        watcher
            .into_events()
            .into_iter()
            .filter_map(|event| match event {
                RecordedEvent::Failed { message } => Some(message),
                _ => None,
            })
            .collect::<Vec<_>>()
    };

    let first = failure_messages();
    assert_eq!(first, failure_messages());

    // Setup and teardown both failed: the teardown error is the one reported.
    assert_eq!(first[0], "teardown failed: relay stuck");
    assert_eq!(
        &first[1..],
        [
            "2 expectation(s) failed: DTC P0A80 present; DTC U0100 present",
            "setup failed: relay driver not responding",
            "gain 1 out of range",
            "gain 2 out of range",
        ]
    );
}
