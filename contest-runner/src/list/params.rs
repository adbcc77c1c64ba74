// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::ParamAccessError;
use indexmap::IndexMap;
use serde_json::Value;
use std::borrow::Cow;

/// The value(s) of one parameter set, resolved into the shape the test body receives.
///
/// The shape is decided once, when the set is created: sequences are passed as positional
/// arguments, mappings as named arguments, and anything else as a single argument.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    /// Positional arguments.
    Positional(Vec<Value>),

    /// Named (keyword) arguments.
    Named(IndexMap<String, Value>),

    /// A single argument.
    Single(Value),
}

impl ParamValue {
    /// Resolves the shape of `value`: arrays become positional arguments, objects become named
    /// arguments, and everything else is a single argument.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(values) => Self::Positional(values),
            Value::Object(map) => Self::Named(map.into_iter().collect()),
            other => Self::Single(other),
        }
    }

    /// Returns the arguments view passed to the test body.
    pub fn as_args(&self) -> TestArgs<'_> {
        match self {
            Self::Positional(values) => TestArgs::Positional(values),
            Self::Named(map) => TestArgs::Named(map),
            Self::Single(value) => TestArgs::Single(value),
        }
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

/// One entry in a parameterized test's expansion.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSet {
    index: usize,
    value: ParamValue,
    label: Option<String>,
    run: bool,
}

impl ParameterSet {
    /// Creates a new parameter set with the given index and value.
    ///
    /// The set runs by default; use [`deselect`](Self::deselect) to exclude it.
    pub fn new(index: usize, value: impl Into<ParamValue>) -> Self {
        Self {
            index,
            value: value.into(),
            label: None,
            run: true,
        }
    }

    /// Sets a label used instead of the index in display names.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Marks this set as not selected: it is never attempted.
    pub fn deselect(mut self) -> Self {
        self.run = false;
        self
    }

    /// Returns the index of this set, stable across a run.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the value of this set.
    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    /// Returns the label of this set, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns true if this set should execute.
    pub fn should_run(&self) -> bool {
        self.run
    }

    /// Returns the suffix that distinguishes this set from its siblings: the label if there is
    /// one, otherwise the index.
    pub fn suffix(&self) -> Cow<'_, str> {
        match &self.label {
            Some(label) => Cow::Borrowed(label),
            None => Cow::Owned(self.index.to_string()),
        }
    }

    /// Returns the display name of this set for the given test: `name[suffix]`.
    pub fn display_name(&self, test_name: &str) -> String {
        format!("{test_name}[{}]", self.suffix())
    }
}

/// Options for how the sets of a parameterized test are dispatched.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ParameterizedOptions {
    /// Run the sets in a random order.
    pub random_order: bool,

    /// Stop running the remaining sets as soon as one fails.
    pub stop_on_first_failure: bool,
}

/// The arguments a test body is invoked with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TestArgs<'a> {
    /// The test is not parameterized.
    None,

    /// Positional arguments.
    Positional(&'a [Value]),

    /// Named arguments.
    Named(&'a IndexMap<String, Value>),

    /// A single argument.
    Single(&'a Value),
}

impl<'a> TestArgs<'a> {
    /// Returns the positional argument at `index`.
    pub fn positional(&self, index: usize) -> Result<&'a Value, ParamAccessError> {
        match self {
            Self::Positional(values) => {
                values
                    .get(index)
                    .ok_or(ParamAccessError::MissingPositional {
                        index,
                        available: values.len(),
                    })
            }
            other => Err(other.mismatch("positional")),
        }
    }

    /// Returns the named argument `name`.
    pub fn named(&self, name: &str) -> Result<&'a Value, ParamAccessError> {
        match self {
            Self::Named(map) => map.get(name).ok_or_else(|| ParamAccessError::MissingNamed {
                name: name.to_owned(),
            }),
            other => Err(other.mismatch("named")),
        }
    }

    /// Returns the single argument.
    pub fn single(&self) -> Result<&'a Value, ParamAccessError> {
        match self {
            Self::Single(value) => Ok(value),
            other => Err(other.mismatch("single")),
        }
    }

    /// Returns true if the test was invoked without arguments.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    fn shape(&self) -> &'static str {
        match self {
            Self::None => "no",
            Self::Positional(_) => "positional",
            Self::Named(_) => "named",
            Self::Single(_) => "single",
        }
    }

    fn mismatch(&self, expected: &'static str) -> ParamAccessError {
        ParamAccessError::ShapeMismatch {
            expected,
            actual: self.shape(),
        }
    }
}
