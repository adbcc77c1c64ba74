// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

/// Per-invocation state threaded through setup, test body and teardown.
///
/// The context accumulates soft expectation failures and warnings, and carries scoped parameters
/// that a setup function can hand to the test body. The runner resets it before and after every
/// invocation, so nothing recorded by one test is visible to the next.
#[derive(Clone, Debug, Default)]
pub struct TestContext {
    display_name: String,
    loop_index: usize,
    param_index: Option<usize>,
    expectation_failures: Vec<String>,
    warnings: Vec<String>,
    params: IndexMap<String, Value>,
}

impl TestContext {
    /// Records an expectation failure with `message` if `condition` is false.
    ///
    /// Unlike returning an error, a failed expectation doesn't stop the test body. The test fails
    /// once the body returns. Returns `condition`.
    pub fn expect(&mut self, condition: bool, message: impl Into<String>) -> bool {
        if !condition {
            self.expectation_failures.push(message.into());
        }
        condition
    }

    /// Records an expectation failure if `actual` is not equal to `expected`.
    ///
    /// Returns true if the values are equal.
    pub fn expect_eq<T>(&mut self, actual: T, expected: T, message: impl fmt::Display) -> bool
    where
        T: PartialEq + fmt::Debug,
    {
        if actual == expected {
            return true;
        }
        self.expectation_failures
            .push(format!("{message}: expected {expected:?}, got {actual:?}"));
        false
    }

    /// Records a warning. A test that records warnings and otherwise passes is inconclusive.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Sets a scoped parameter, visible until the end of the invocation.
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.params.insert(name.into(), value.into());
    }

    /// Returns a scoped parameter.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Removes and returns a scoped parameter.
    pub fn take_param(&mut self, name: &str) -> Option<Value> {
        self.params.shift_remove(name)
    }

    /// Returns the expectation failures recorded so far.
    pub fn expectation_failures(&self) -> &[String] {
        &self.expectation_failures
    }

    /// Returns the warnings recorded so far.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Returns the display name of the running invocation.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the loop iteration, starting at 1.
    pub fn loop_index(&self) -> usize {
        self.loop_index
    }

    /// Returns the index of the running parameter set, if any.
    pub fn param_index(&self) -> Option<usize> {
        self.param_index
    }

    /// Clears expectation failures, warnings and scoped parameters.
    pub fn reset(&mut self) {
        self.expectation_failures.clear();
        self.warnings.clear();
        self.params.clear();
    }

    pub(crate) fn begin(
        &mut self,
        display_name: impl Into<String>,
        loop_index: usize,
        param_index: Option<usize>,
    ) {
        self.reset();
        self.display_name = display_name.into();
        self.loop_index = loop_index;
        self.param_index = param_index;
    }

    pub(crate) fn take_expectation_failures(&mut self) -> Vec<String> {
        std::mem::take(&mut self.expectation_failures)
    }
}
