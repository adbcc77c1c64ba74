// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError, OutputWriter,
    errors::Result,
    output::{OutputContext, OutputOpts, clap_styles},
};
use camino::Utf8PathBuf;
use clap::Parser;
use contest_metadata::{ContestExitCode, Verdict};
use contest_runner::{
    config::{ContestConfig, LoopCount, RunConfig, RunConfigOverrides},
    list::{TestList, TestSuite},
    record::ExecutionRecordStore,
    reporter::ConsoleReporter,
    runner::TestRunnerBuilder,
    test_filter::TagFilter,
};
use std::io::Write;
use tracing::info;

/// Runs a contest test suite.
#[derive(Debug, Parser)]
#[command(
    name = "contest",
    version,
    about = "Runs a contest test suite",
    styles = clap_styles::style()
)]
pub struct ContestApp {
    #[command(flatten)]
    output: OutputOpts,

    /// Workspace root, used to find `.config/contest.toml`
    #[arg(long, value_name = "DIR", default_value = ".")]
    workspace_root: Utf8PathBuf,

    /// Config file [default: workspace-root/.config/contest.toml]
    #[arg(long, value_name = "PATH")]
    config_file: Option<Utf8PathBuf>,

    /// Configuration profile to use
    #[arg(long, short = 'P', env = "CONTEST_PROFILE", value_name = "PROFILE")]
    profile: Option<String>,

    /// Number of times to repeat the whole plan
    #[arg(long, value_name = "N")]
    loop_count: Option<usize>,

    /// Run tests in a random order
    #[arg(long)]
    random: bool,

    /// Seed for random ordering
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Run every test that is not selected
    #[arg(long)]
    reverse_selection: bool,

    /// Abort the remaining plan after the first failing invocation
    #[arg(long)]
    stop_on_first_failure: bool,

    /// Only run tests matching this filter; may be repeated, and every filter must match
    #[arg(long = "filter", short = 'F', value_name = "KIND=V1,V2")]
    filters: Vec<TagFilter>,

    /// Replay the selection from a previous execution record
    #[arg(long, value_name = "PATH", conflicts_with = "tests")]
    replay: Option<Utf8PathBuf>,

    /// Verdicts to select when replaying
    #[arg(
        long,
        value_name = "VERDICTS",
        value_delimiter = ',',
        default_values_t = [Verdict::Fail, Verdict::Inconclusive],
        requires = "replay"
    )]
    replay_verdicts: Vec<Verdict>,

    /// Write an execution record for this run
    #[arg(long, value_name = "PATH")]
    record: Option<Utf8PathBuf>,

    /// List the tests that would run, in order, without running them
    #[arg(long)]
    list: bool,

    /// Tests to run, as `name` or `name[set]` [default: all tests]
    #[arg(value_name = "TESTS")]
    tests: Vec<String>,
}

impl ContestApp {
    /// Initializes logging and returns the output context.
    fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    fn overrides(&self) -> Result<RunConfigOverrides> {
        let selected_tests = match &self.replay {
            Some(path) => {
                let store = ExecutionRecordStore::new(path.clone());
                let record = store
                    .load()?
                    .ok_or_else(|| ExpectedError::ReplayRecordNotFound { path: path.clone() })?;
                let selected = record.select(&self.replay_verdicts);
                info!(
                    "replaying {} tests from execution record at {path}",
                    selected.len()
                );
                Some(selected)
            }
            None if self.tests.is_empty() => None,
            None => Some(self.tests.clone()),
        };

        Ok(RunConfigOverrides {
            loop_count: self.loop_count.map(LoopCount::new),
            random_execution: self.random.then_some(true),
            seed: self.seed,
            reverse_selection: self.reverse_selection.then_some(true),
            stop_on_first_failure: self.stop_on_first_failure.then_some(true),
            filters: self.filters.clone(),
            selected_tests,
            setup_file: None,
        })
    }

    /// Resolves the run configuration from config files and command-line arguments.
    fn run_config(&self) -> Result<RunConfig> {
        let config =
            ContestConfig::from_sources(&self.workspace_root, self.config_file.as_deref())?;
        let profile = self
            .profile
            .as_deref()
            .unwrap_or(RunConfig::DEFAULT_PROFILE);
        let mut run_config = config.profile(profile)?;
        run_config.apply_overrides(self.overrides()?);
        Ok(run_config)
    }

    /// Executes the app against `suite`, returning the process exit code.
    pub(crate) fn exec(
        self,
        suite: TestSuite,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32> {
        let run_config = self.run_config()?;
        // An empty selection means every test, which is never what a replay wants.
        if self.replay.is_some() && run_config.selected_tests.is_empty() {
            info!("execution record has no matching tests, nothing to replay");
            return Ok(ContestExitCode::OK);
        }
        let list = TestList::new(suite, run_config.setup_file.as_deref())?;
        let profile_name = run_config.profile_name.clone();
        let random_execution = run_config.random_execution;

        let colorize = output_writer.is_terminal()
            && output.color.should_colorize(supports_color::Stream::Stdout);
        let mut writer = output_writer.stdout_writer();

        let runner = TestRunnerBuilder::new(run_config).build(&list);
        if self.list {
            for name in runner.plan().names() {
                writeln!(writer, "{name}")
                    .map_err(|err| ExpectedError::WriteOutputError { err })?;
            }
            writer
                .flush()
                .map_err(|err| ExpectedError::WriteOutputError { err })?;
            return Ok(ContestExitCode::OK);
        }

        let mut reporter = ConsoleReporter::new(&mut writer);
        if colorize {
            reporter.colorize();
        }
        reporter.set_verbose(output.verbose);
        let record = runner.execute(&mut reporter);
        reporter
            .into_inner()
            .and_then(|writer| writer.flush())
            .map_err(|err| ExpectedError::WriteOutputError { err })?;

        if let Some(path) = &self.record {
            ExecutionRecordStore::new(path.clone())
                .save(&record.to_execution_record(&profile_name, random_execution))?;
            info!("wrote execution record to {path}");
        }

        Ok(record.exit_code())
    }
}

/// The entry point for a test binary built on contest.
#[derive(Debug)]
pub struct Harness {
    suite: TestSuite,
}

impl Harness {
    /// Creates a new harness for `suite`.
    pub fn new(suite: TestSuite) -> Self {
        Self { suite }
    }

    /// Parses the process's command-line arguments, runs the suite and exits the process with the
    /// run's exit code.
    pub fn main(self) -> color_eyre::Result<()> {
        color_eyre::install()?;
        let app = ContestApp::parse();
        let code = self.exec(app, &mut OutputWriter::default());
        std::process::exit(code)
    }

    /// Runs the suite with already-parsed arguments, returning the exit code.
    ///
    /// Errors outside the test plan are printed to stderr and mapped to
    /// [`GENERAL_ERROR`](ContestExitCode::GENERAL_ERROR).
    pub fn exec(self, app: ContestApp, output_writer: &mut OutputWriter) -> i32 {
        let output = app.init_output();
        match app.exec(self.suite, output, output_writer) {
            Ok(code) => code,
            Err(error) => {
                error.display_to_stderr(&output.stderr_styles());
                error.process_exit_code()
            }
        }
    }
}
