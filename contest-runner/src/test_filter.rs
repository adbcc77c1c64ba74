// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filtering tests based on user-specified parameters.
//!
//! The main structure in this module is [`TestFilter`], which is created by a
//! [`TestFilterBuilder`].

use crate::{
    errors::TestFilterBuildError,
    list::{TestDescriptor, TestList},
};
use serde::Deserialize;
use std::{
    collections::{BTreeSet, HashMap},
    fmt,
    str::FromStr,
};
use tracing::warn;

/// The attribute of a test that a [`TagFilter`] matches against.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FilterKind {
    /// Matches any of the test's tags.
    Tag,

    /// Matches any of the test's requirement IDs.
    Requirement,

    /// Matches any of the test's automation IDs.
    AutomationId,

    /// Matches the test's priority.
    Priority,

    /// Matches the test's name.
    Name,
}

impl FilterKind {
    /// Returns the string names of all filter kinds.
    pub fn variants() -> &'static [&'static str] {
        &["tag", "requirement", "automation-id", "priority", "name"]
    }

    /// Returns the string name of this filter kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Requirement => "requirement",
            Self::AutomationId => "automation-id",
            Self::Priority => "priority",
            Self::Name => "name",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = TestFilterBuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tag" => Ok(Self::Tag),
            "requirement" => Ok(Self::Requirement),
            "automation-id" => Ok(Self::AutomationId),
            "priority" => Ok(Self::Priority),
            "name" => Ok(Self::Name),
            other => Err(TestFilterBuildError::UnknownFilterKind {
                input: other.to_owned(),
            }),
        }
    }
}

/// A single filter: a test matches if its attribute of `kind` matches any of `values`.
///
/// A run can have several filters, and a test must match all of them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TagFilter {
    kind: FilterKind,
    values: BTreeSet<String>,
}

impl TagFilter {
    /// Creates a new filter. Returns an error if `values` is empty.
    pub fn new(
        kind: FilterKind,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, TestFilterBuildError> {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(TestFilterBuildError::EmptyFilterValues { kind });
        }
        Ok(Self { kind, values })
    }

    /// Returns the kind of this filter.
    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Returns the values of this filter.
    pub fn values(&self) -> &BTreeSet<String> {
        &self.values
    }

    /// Returns true if `descriptor` matches any of this filter's values.
    pub fn matches(&self, descriptor: &TestDescriptor) -> bool {
        match self.kind {
            FilterKind::Tag => descriptor
                .test_tags()
                .iter()
                .any(|tag| self.values.contains(tag)),
            FilterKind::Requirement => descriptor
                .requirement_ids()
                .iter()
                .any(|id| self.values.contains(id)),
            FilterKind::AutomationId => descriptor
                .automation_id_list()
                .iter()
                .any(|id| self.values.contains(id)),
            FilterKind::Priority => {
                let priority = descriptor.test_priority().as_str();
                self.values
                    .iter()
                    .any(|value| value.eq_ignore_ascii_case(priority))
            }
            FilterKind::Name => self.values.contains(descriptor.name()),
        }
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.kind)?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(value)?;
        }
        Ok(())
    }
}

/// Parses the `kind=value1,value2` command-line form.
impl FromStr for TagFilter {
    type Err = TestFilterBuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, values) =
            s.split_once('=')
                .ok_or_else(|| TestFilterBuildError::InvalidSyntax {
                    input: s.to_owned(),
                })?;
        let kind: FilterKind = kind.trim().parse()?;
        let values = values
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty());
        Self::new(kind, values)
    }
}

impl<'de> Deserialize<'de> for TagFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Raw {
            kind: String,
            values: Vec<String>,
        }

        let raw = Raw::deserialize(deserializer)?;
        let kind = raw.kind.parse().map_err(serde::de::Error::custom)?;
        Self::new(kind, raw.values).map_err(serde::de::Error::custom)
    }
}

/// A builder for [`TestFilter`] instances.
#[derive(Clone, Debug, Default)]
pub struct TestFilterBuilder {
    filters: Vec<TagFilter>,
    selection: Vec<String>,
    reverse: bool,
}

impl TestFilterBuilder {
    /// Creates a new builder.
    ///
    /// `selection` entries are either test names or `name[suffix]` parameter set names. An empty
    /// selection selects every test.
    pub fn new(
        filters: Vec<TagFilter>,
        selection: impl IntoIterator<Item = impl Into<String>>,
        reverse: bool,
    ) -> Self {
        Self {
            filters,
            selection: selection.into_iter().map(Into::into).collect(),
            reverse,
        }
    }

    /// Resolves the selection against `list`, returning a [`TestFilter`].
    ///
    /// Selection entries that don't name a test in the list are logged and ignored.
    pub fn build(self, list: &TestList) -> TestFilter {
        let selection = if self.selection.is_empty() {
            None
        } else {
            let mut selection: HashMap<String, Selected> = HashMap::new();
            for entry in &self.selection {
                let (name, suffix) = split_selection_entry(entry);
                if list.get(name).is_none() {
                    warn!("selected test `{entry}` is not in the test list, ignoring");
                    continue;
                }
                let selected = selection
                    .entry(name.to_owned())
                    .or_insert_with(|| Selected::Sets(BTreeSet::new()));
                match (suffix, &mut *selected) {
                    (None, _) => *selected = Selected::Whole,
                    (Some(suffix), Selected::Sets(sets)) => {
                        sets.insert(suffix.to_owned());
                    }
                    (Some(_), Selected::Whole) => {}
                }
            }
            Some(selection)
        };

        TestFilter {
            filters: self.filters,
            selection,
            reverse: self.reverse,
        }
    }
}

/// Splits `name[suffix]` into its parts.
fn split_selection_entry(entry: &str) -> (&str, Option<&str>) {
    if let Some(rest) = entry.strip_suffix(']')
        && let Some((name, suffix)) = rest.split_once('[')
    {
        return (name, Some(suffix));
    }
    (entry, None)
}

#[derive(Clone, Debug)]
enum Selected {
    Whole,
    Sets(BTreeSet<String>),
}

/// Decides which tests, and which parameter sets of those tests, are part of a run.
#[derive(Clone, Debug)]
pub struct TestFilter {
    filters: Vec<TagFilter>,
    selection: Option<HashMap<String, Selected>>,
    reverse: bool,
}

impl TestFilter {
    /// Returns a filter that matches every test.
    pub fn all() -> Self {
        Self {
            filters: Vec::new(),
            selection: None,
            reverse: false,
        }
    }

    /// Returns whether `descriptor` is part of the run.
    pub fn filter_match(&self, descriptor: &TestDescriptor) -> FilterMatch {
        let selected = match &self.selection {
            None => Some(None),
            Some(selection) => match selection.get(descriptor.name()) {
                Some(Selected::Whole) => Some(None),
                Some(Selected::Sets(sets)) => Some(Some(sets)),
                None => None,
            },
        };
        let filtered = self.filters.iter().all(|filter| filter.matches(descriptor));

        if self.reverse {
            match selected {
                Some(None) if filtered => FilterMatch::Mismatch {
                    reason: MismatchReason::Reversed,
                },
                // Sets that weren't selected are still part of the complement.
                Some(Some(sets)) if filtered => FilterMatch::Matches {
                    sets: SetSelection::Except(sets.clone()),
                },
                _ => FilterMatch::Matches {
                    sets: SetSelection::All,
                },
            }
        } else {
            match selected {
                None => FilterMatch::Mismatch {
                    reason: MismatchReason::NotSelected,
                },
                Some(_) if !filtered => FilterMatch::Mismatch {
                    reason: MismatchReason::Filter,
                },
                Some(None) => FilterMatch::Matches {
                    sets: SetSelection::All,
                },
                Some(Some(sets)) => FilterMatch::Matches {
                    sets: SetSelection::Only(sets.clone()),
                },
            }
        }
    }
}

/// Which parameter sets of a matching test are part of a run.
///
/// Tests that aren't parameterized run regardless of this value.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum SetSelection {
    /// Every active set.
    #[default]
    All,

    /// Only the sets with these suffixes.
    Only(BTreeSet<String>),

    /// Every active set except the ones with these suffixes.
    Except(BTreeSet<String>),
}

impl SetSelection {
    /// Returns true if the set with `suffix` is part of the run.
    pub fn contains(&self, suffix: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(sets) => sets.contains(suffix),
            Self::Except(sets) => !sets.contains(suffix),
        }
    }
}

/// The result of matching a test against a [`TestFilter`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FilterMatch {
    /// The test is part of the run.
    Matches {
        /// The parameter sets that are part of the run.
        sets: SetSelection,
    },

    /// The test is not part of the run.
    Mismatch {
        /// The reason the test doesn't match.
        reason: MismatchReason,
    },
}

impl FilterMatch {
    /// Returns true if the test is part of the run.
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matches { .. })
    }
}

/// The reason a test doesn't match a [`TestFilter`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MismatchReason {
    /// The test isn't in the selection list.
    NotSelected,

    /// The test doesn't match every filter.
    Filter,

    /// The test was selected, but reverse selection is enabled.
    Reversed,
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSelected => write!(f, "not selected"),
            Self::Filter => write!(f, "does not match filters"),
            Self::Reversed => write!(f, "excluded by reverse selection"),
        }
    }
}
