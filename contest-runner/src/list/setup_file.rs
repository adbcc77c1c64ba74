// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{FixtureFn, TestDescriptor, TestResult};
use crate::runner::TestContext;
use debug_ignore::DebugIgnore;
use std::collections::BTreeMap;

/// A named collection of setup and teardown functions.
///
/// A setup file provides the standard per-test setup and teardown, the global setup and teardown
/// that bracket a run, and any number of custom functions that descriptors refer to by name.
#[derive(Debug, Default)]
pub struct SetupFile {
    name: String,
    setup: Option<DebugIgnore<FixtureFn>>,
    teardown: Option<DebugIgnore<FixtureFn>>,
    global_setup: Option<DebugIgnore<FixtureFn>>,
    global_teardown: Option<DebugIgnore<FixtureFn>>,
    custom: BTreeMap<String, DebugIgnore<FixtureFn>>,
}

impl SetupFile {
    /// Creates a new, empty setup file.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the standard setup, run before every test without a custom setup.
    pub fn setup(mut self, f: impl Fn(&mut TestContext) -> TestResult + 'static) -> Self {
        self.setup = Some(DebugIgnore(Box::new(f)));
        self
    }

    /// Sets the standard teardown, run after every test without a custom teardown.
    pub fn teardown(mut self, f: impl Fn(&mut TestContext) -> TestResult + 'static) -> Self {
        self.teardown = Some(DebugIgnore(Box::new(f)));
        self
    }

    /// Sets the global setup, run once before the first test.
    pub fn global_setup(mut self, f: impl Fn(&mut TestContext) -> TestResult + 'static) -> Self {
        self.global_setup = Some(DebugIgnore(Box::new(f)));
        self
    }

    /// Sets the global teardown, run once at the end of the run.
    pub fn global_teardown(
        mut self,
        f: impl Fn(&mut TestContext) -> TestResult + 'static,
    ) -> Self {
        self.global_teardown = Some(DebugIgnore(Box::new(f)));
        self
    }

    /// Registers a custom function that descriptors can use as setup or teardown.
    pub fn function(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&mut TestContext) -> TestResult + 'static,
    ) -> Self {
        self.custom.insert(name.into(), DebugIgnore(Box::new(f)));
        self
    }

    /// Returns the name of this setup file.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if a custom function with this name exists.
    pub fn has_function(&self, name: &str) -> bool {
        self.custom.contains_key(name)
    }

    /// Returns true if a global setup function exists.
    pub fn has_global_setup(&self) -> bool {
        self.global_setup.is_some()
    }

    /// Returns true if a global teardown function exists.
    pub fn has_global_teardown(&self) -> bool {
        self.global_teardown.is_some()
    }

    /// Resolves the setup for `descriptor`: its custom setup if declared, else the standard one.
    pub fn resolve_setup(&self, descriptor: &TestDescriptor) -> Option<&FixtureFn> {
        self.resolve(descriptor.custom_setup_name(), self.setup.as_ref())
    }

    /// Resolves the teardown for `descriptor`: its custom teardown if declared, else the standard
    /// one.
    pub fn resolve_teardown(&self, descriptor: &TestDescriptor) -> Option<&FixtureFn> {
        self.resolve(descriptor.custom_teardown_name(), self.teardown.as_ref())
    }

    pub(crate) fn global_setup_fn(&self) -> Option<&FixtureFn> {
        self.global_setup.as_deref()
    }

    pub(crate) fn global_teardown_fn(&self) -> Option<&FixtureFn> {
        self.global_teardown.as_deref()
    }

    fn resolve<'a>(
        &'a self,
        custom: Option<&str>,
        standard: Option<&'a DebugIgnore<FixtureFn>>,
    ) -> Option<&'a FixtureFn> {
        match custom {
            // References are checked when the test list is built, so a miss here only happens for
            // descriptors that were never part of the list.
            Some(name) => self.custom.get(name).map(|f| &f.0),
            None => standard.map(|f| &f.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(f: Option<&FixtureFn>, cx: &mut TestContext) -> Option<String> {
        f.map(|f| {
            f(cx).expect("fixture succeeded");
            cx.take_param("ran")
                .and_then(|v| v.as_str().map(ToOwned::to_owned))
                .unwrap_or_default()
        })
    }

    #[test]
    fn custom_functions_take_precedence() {
        let setup_file = SetupFile::new("bench")
            .setup(|cx| {
                cx.set_param("ran", "standard setup");
                Ok(())
            })
            .function("power_on", |cx| {
                cx.set_param("ran", "power_on");
                Ok(())
            });

        let plain = TestDescriptor::new("test_plain", |_, _| Ok(()));
        let custom = TestDescriptor::new("test_custom", |_, _| Ok(())).custom_setup("power_on");

        let mut cx = TestContext::default();
        assert_eq!(
            run(setup_file.resolve_setup(&plain), &mut cx).as_deref(),
            Some("standard setup")
        );
        assert_eq!(
            run(setup_file.resolve_setup(&custom), &mut cx).as_deref(),
            Some("power_on")
        );
        assert!(setup_file.resolve_teardown(&plain).is_none());
        assert!(setup_file.has_function("power_on"));
        assert!(!setup_file.has_global_setup());
    }
}
