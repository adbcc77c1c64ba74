// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data models for fixture information.

use bitflags::bitflags;
use contest_metadata::Verdict;
use iddqd::{IdOrdItem, id_upcast};

#[derive(Clone, Debug)]
pub struct TestCaseFixture {
    pub name: &'static str,
    pub verdict: Verdict,
    pub sets: &'static [SetFixture],
    properties: TestCaseFixtureProperty,
}

impl TestCaseFixture {
    pub fn new(name: &'static str, verdict: Verdict) -> Self {
        Self {
            name,
            verdict,
            sets: &[],
            properties: TestCaseFixtureProperty::empty(),
        }
    }

    pub fn with_sets(mut self, sets: &'static [SetFixture]) -> Self {
        self.sets = sets;
        self
    }

    pub fn with_property(mut self, property: TestCaseFixtureProperty) -> Self {
        self.properties |= property;
        self
    }

    pub fn has_property(&self, property: TestCaseFixtureProperty) -> bool {
        self.properties.contains(property)
    }

    /// Whether the test body is expected to be called.
    pub fn is_called(&self) -> bool {
        self.verdict != Verdict::Skip
    }
}

impl IdOrdItem for TestCaseFixture {
    type Key<'a> = &'a str;
    fn key(&self) -> Self::Key<'_> {
        self.name
    }
    id_upcast!();
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SetFixture {
    pub suffix: &'static str,
    pub verdict: Verdict,
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct TestCaseFixtureProperty: u32 {
        const SMOKE = 1;
        const HIGH_PRIORITY = 2;
        const LOW_PRIORITY = 4;
    }
}
