// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{RunStartedInfo, TestInstance, TestWatcher};
use crate::runner::{RunRecord, StopReason, TestFailure};
use contest_metadata::Verdict;
use owo_colors::{OwoColorize, Style};
use std::{fmt, io};
use tracing::warn;

/// A watcher that writes one status line per invocation, and a summary at the end of the run.
///
/// Output is uncolored by default; call [`colorize`](Self::colorize) to enable colors.
#[derive(Debug)]
pub struct ConsoleReporter<W> {
    writer: W,
    styles: Styles,
    verbose: bool,
    current: Option<String>,
    error: Option<io::Error>,
}

impl<W: io::Write> ConsoleReporter<W> {
    /// Creates a new reporter writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            styles: Styles::default(),
            verbose: false,
            current: None,
            error: None,
        }
    }

    /// Colorizes output.
    pub fn colorize(&mut self) {
        self.styles.colorize();
    }

    /// Also writes a line when each invocation starts.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Returns the writer, or the first error encountered while writing to it.
    pub fn into_inner(self) -> io::Result<W> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.writer),
        }
    }

    fn write_status(&mut self, status: &str, style: Style, detail: fmt::Arguments<'_>) {
        let name = self.current.take().unwrap_or_default();
        self.write_line(format_args!(
            "{:>12} {}{}",
            status.style(style),
            name.style(self.styles.name),
            detail
        ));
    }

    fn write_line(&mut self, args: fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = writeln!(self.writer, "{args}") {
            warn!("failed to write test output: {error}");
            self.error = Some(error);
        }
    }
}

impl<W: io::Write> TestWatcher for ConsoleReporter<W> {
    fn run_started(&mut self, info: &RunStartedInfo) {
        let order = if info.random_execution {
            format!("random order, seed {}", info.seed)
        } else {
            "priority order".to_owned()
        };
        self.write_line(format_args!(
            "{:>12} {} {} ({}, loop count {})",
            "Starting".style(self.styles.pass),
            info.plan_len.style(self.styles.count),
            if info.plan_len == 1 { "test" } else { "tests" },
            order,
            info.loop_count,
        ));
    }

    fn test_started(&mut self, instance: &TestInstance<'_>) {
        self.current = Some(instance.display_name.to_owned());
        if self.verbose {
            self.write_line(format_args!(
                "{:>12} {}",
                "START".style(self.styles.count),
                instance.display_name.style(self.styles.name),
            ));
        }
    }

    fn test_skipped(&mut self, reason: &str) {
        self.write_status("SKIP", self.styles.skip, format_args!(": {reason}"));
    }

    fn test_succeeded(&mut self) {
        self.write_status("PASS", self.styles.pass, format_args!(""));
    }

    fn test_failed(&mut self, failure: &TestFailure) {
        self.write_status("FAIL", self.styles.fail, format_args!(": {failure}"));
    }

    fn test_inconclusive(&mut self, warnings: &[String]) {
        let warnings = warnings.join("; ");
        self.write_status(
            "INCONCLUSIVE",
            self.styles.inconclusive,
            format_args!(": {warnings}"),
        );
    }

    fn test_finished(&mut self) {
        self.current = None;
    }

    fn group_finished(&mut self, name: &str, verdict: Verdict, failure: Option<&TestFailure>) {
        let style = self.styles.for_verdict(verdict);
        match failure {
            Some(failure) => self.write_line(format_args!(
                "{:>12} {}: {} ({failure})",
                "GROUP".style(self.styles.count),
                name.style(self.styles.name),
                verdict.style(style),
            )),
            None => self.write_line(format_args!(
                "{:>12} {}: {}",
                "GROUP".style(self.styles.count),
                name.style(self.styles.name),
                verdict.style(style),
            )),
        }
    }

    fn run_finished(&mut self, record: &RunRecord) {
        let stats = *record.stats();
        let summary_style = if record.exit_code() == 0 {
            self.styles.pass
        } else {
            self.styles.fail
        };
        self.write_line(format_args!("------------"));
        self.write_line(format_args!(
            "{:>12} {} {}: {} passed, {} failed, {} inconclusive, {} skipped",
            "Summary".style(summary_style),
            stats.finished_count.style(self.styles.count),
            if stats.finished_count == 1 {
                "invocation"
            } else {
                "invocations"
            },
            stats.passed.style(self.styles.pass),
            stats.failed.style(self.styles.fail),
            stats.inconclusive.style(self.styles.inconclusive),
            stats.skipped.style(self.styles.skip),
        ));
        if record.global_setup_failed() {
            self.write_line(format_args!(
                "{:>12} global setup failed, no test was run",
                "NOTE".style(self.styles.fail),
            ));
        }
        if let Some(reason) = record.stop_reason() {
            let message = match reason {
                StopReason::Interrupted => "run was interrupted".to_owned(),
                StopReason::FirstFailure { display_name } => {
                    format!("stopped after first failure in {display_name}")
                }
            };
            self.write_line(format_args!(
                "{:>12} {message}",
                "NOTE".style(self.styles.skip)
            ));
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Styles {
    count: Style,
    name: Style,
    pass: Style,
    fail: Style,
    inconclusive: Style,
    skip: Style,
}

impl Styles {
    fn colorize(&mut self) {
        self.count = Style::new().bold();
        self.name = Style::new().bold();
        self.pass = Style::new().green().bold();
        self.fail = Style::new().red().bold();
        self.inconclusive = Style::new().magenta().bold();
        self.skip = Style::new().yellow().bold();
    }

    fn for_verdict(&self, verdict: Verdict) -> Style {
        match verdict {
            Verdict::Pass => self.pass,
            Verdict::Fail => self.fail,
            Verdict::Inconclusive => self.inconclusive,
            Verdict::Skip => self.skip,
            Verdict::Unknown => self.count,
        }
    }
}
