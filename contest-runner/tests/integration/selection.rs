// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use camino_tempfile::tempdir;
use color_eyre::eyre::Result;
use contest_metadata::{ExecutionRecord, Verdict};
use contest_runner::{
    config::{ContestConfig, RunConfig, RunConfigOverrides},
    list::{ParameterSet, ParameterizedOptions, TestDescriptor, TestList, TestSuite},
    record::ExecutionRecordStore,
    test_filter::{FilterKind, TagFilter},
};
use indoc::indoc;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

fn hil_sil_list(calls: &CallLog) -> TestList {
    let suite = TestSuite::new()
        .test(TestDescriptor::new("T1", logging_body(calls, "T1")).tag("hil"))
        .test(TestDescriptor::new("T2", logging_body(calls, "T2")).tag("sil"))
        .test(TestDescriptor::new("T3", logging_body(calls, "T3")).tags(["hil", "sil"]));
    TestList::new(suite, None).expect("suite is valid")
}

#[test_case(&["tag=hil,sil"], &["T1", "T2", "T3"]; "any value within a filter")]
#[test_case(&["tag=hil", "tag=sil"], &["T3"]; "every filter must match")]
#[test_case(&["tag=sil"], &["T2", "T3"]; "single value")]
#[test_case(&["tag=can"], &[]; "no match")]
fn test_tag_filters(filters: &[&str], expected: &[&str]) {
    let calls = CallLog::default();
    let list = hil_sil_list(&calls);
    let mut config = RunConfig::default();
    config.filters = filters
        .iter()
        .map(|filter| filter.parse::<TagFilter>().expect("valid filter"))
        .collect();
    run(&list, config);

    assert_eq!(calls.bodies(), expected);
}

#[test]
fn test_reverse_selection() {
    let calls = CallLog::default();
    let list = hil_sil_list(&calls);
    let mut config = RunConfig::default();
    config.selected_tests = vec!["T1".to_owned(), "T2".to_owned()];
    config.reverse_selection = true;
    let (record, _) = run(&list, config);

    assert_eq!(calls.bodies(), ["T3"]);
    assert_eq!(record.verdicts().len(), 1);
}

/// `test_gain` with sets 0, 1 (deselected) and 2, followed by `test_offset`.
fn gain_list(calls: &CallLog, skip: bool) -> TestList {
    let sets = vec![
        ParameterSet::new(0, json!(1)),
        ParameterSet::new(1, json!(2)).deselect(),
        ParameterSet::new(2, json!(4)),
    ];
    let suite = TestSuite::new()
        .test(
            TestDescriptor::new("test_gain", display_name_body(calls))
                .parameterized_sets(sets, ParameterizedOptions::default())
                .skip_if(skip, "amplifier not fitted"),
        )
        .test(TestDescriptor::new("test_offset", display_name_body(calls)));
    TestList::new(suite, None).expect("suite is valid")
}

#[test]
fn test_reverse_selection_of_sets() {
    let calls = CallLog::default();
    let list = gain_list(&calls, false);
    let mut config = RunConfig::default();
    config.selected_tests = vec!["test_gain[0]".to_owned()];
    config.reverse_selection = true;
    let (record, _) = run(&list, config);

    // The unselected sibling set still runs. The deselected set never does.
    assert_eq!(calls.bodies(), ["test_gain[2]", "test_offset"]);
    assert_eq!(record.verdict("test_gain[0]"), None);
    assert_eq!(record.verdict("test_gain[2]"), Some(Verdict::Pass));
    assert_eq!(
        record.group_verdicts().get("test_gain"),
        Some(&Verdict::Pass)
    );
}

#[test]
fn test_select_set_of_skipped_group() {
    let calls = CallLog::default();
    let list = gain_list(&calls, true);
    let mut config = RunConfig::default();
    config.selected_tests = vec!["test_gain[2]".to_owned()];
    let (record, watcher) = run(&list, config);

    assert_eq!(calls.bodies(), Vec::<String>::new());
    assert_eq!(watcher.started_names(), ["test_gain[2]"]);
    assert_eq!(record.verdicts().len(), 1);
    assert_eq!(record.verdict("test_gain[2]"), Some(Verdict::Skip));
    assert_eq!(
        record.group_verdicts().get("test_gain"),
        Some(&Verdict::Skip)
    );
}

#[test]
fn test_select_parameter_sets() {
    let calls = CallLog::default();
    let list = bench_list(&calls);
    let mut config = RunConfig::default();
    config.selected_tests = vec![
        "test_baudrate[57600]".to_owned(),
        "test_supply_rail[3v3]".to_owned(),
        "test_supply_rail[12v]".to_owned(),
        "test_power_on".to_owned(),
        "test_does_not_exist".to_owned(),
    ];
    let (record, _) = run(&list, config);

    assert_eq!(
        calls.bodies(),
        [
            "test_power_on",
            "test_baudrate[57600]",
            "test_supply_rail[3v3]",
            "test_supply_rail[12v]",
        ]
    );
    assert_eq!(
        record.group_verdicts().get("test_baudrate"),
        Some(&Verdict::Fail)
    );
    assert_eq!(
        record.group_verdicts().get("test_supply_rail"),
        Some(&Verdict::Pass)
    );
}

#[test]
fn test_metadata_filters() {
    let calls = CallLog::default();
    let list = bench_list(&calls);
    let mut config = RunConfig::default();
    config.filters = vec![
        TagFilter::new(FilterKind::Requirement, ["REQ-12"]).unwrap(),
        TagFilter::new(FilterKind::Tag, ["smoke", "power"]).unwrap(),
    ];
    run(&list, config);
    assert_eq!(calls.bodies(), ["test_can_bus"]);

    let calls = CallLog::default();
    let list = bench_list(&calls);
    let mut config = RunConfig::default();
    config.filters = vec!["priority=HIGH,low".parse().unwrap()];
    run(&list, config);
    assert_eq!(calls.bodies(), ["test_power_on", "test_boot_time"]);
}

#[test]
fn test_replay_failed() -> Result<()> {
    let dir = tempdir()?;
    let store = ExecutionRecordStore::new(dir.path().join("target/contest/last-run.json"));

    let calls = CallLog::default();
    let list = bench_list(&calls);
    let (record, _) = run(&list, RunConfig::default());
    store.save(&record.to_execution_record(RunConfig::DEFAULT_PROFILE, false))?;

    let loaded: ExecutionRecord = store.load()?.expect("record was saved");
    let selected = loaded.select(&[Verdict::Fail, Verdict::Inconclusive]);
    assert_eq!(
        selected,
        [
            "test_flash_write",
            "test_voltage_check",
            "test_temperature",
            "test_baudrate[57600]",
            "test_supply_rail[5v]",
        ]
    );

    let calls = CallLog::default();
    let list = bench_list(&calls);
    let mut config = RunConfig::default();
    config.apply_overrides(RunConfigOverrides {
        selected_tests: Some(selected),
        ..Default::default()
    });
    let (replayed, _) = run(&list, config);

    assert_eq!(
        calls.bodies(),
        [
            "test_flash_write",
            "test_voltage_check",
            "test_temperature",
            "test_baudrate[57600]",
            "test_supply_rail[5v]",
        ]
    );
    assert_eq!(replayed.stats().failed, 3);
    assert_eq!(replayed.stats().inconclusive, 2);

    Ok(())
}

#[test]
fn test_profile_drives_run() -> Result<()> {
    let workspace = tempdir()?;
    let config_dir = workspace.path().join(".config");
    std::fs::create_dir_all(&config_dir)?;
    std::fs::write(
        config_dir.join("contest.toml"),
        indoc! {r#"
            [profile.smoke]
            loop-count = 2
            stop-on-first-failure = true

            [[profile.smoke.filter]]
            kind = "tag"
            values = ["smoke"]
        "#},
    )?;

    let config = ContestConfig::from_sources(workspace.path(), None)?;
    let run_config = config.profile("smoke")?;
    assert_eq!(run_config.profile_name, "smoke");

    let calls = CallLog::default();
    let list = bench_list(&calls);
    let (record, _) = run(&list, run_config);

    assert_eq!(
        calls.bodies(),
        [
            "test_power_on (loop 1)",
            "test_can_bus (loop 1)",
            "test_power_on (loop 2)",
            "test_can_bus (loop 2)",
        ]
    );
    assert_eq!(record.exit_code(), 0);

    Ok(())
}
