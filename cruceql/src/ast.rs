//! Condition AST for group queries

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::wire::ConditionSpec;

/// Operators a condition can apply to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperatorKind {
    Equals,
    GreaterThanOrEqual,
    LessThanOrEqual,
    In,
    Includes,
}

impl OperatorKind {
    pub const ALL: [OperatorKind; 5] = [
        OperatorKind::Equals,
        OperatorKind::GreaterThanOrEqual,
        OperatorKind::LessThanOrEqual,
        OperatorKind::In,
        OperatorKind::Includes,
    ];

    /// Name used on the wire (`"greaterThanOrEqual"`, `"in"`, ...)
    pub fn as_wire(&self) -> &'static str {
        match self {
            OperatorKind::Equals => "equals",
            OperatorKind::GreaterThanOrEqual => "greaterThanOrEqual",
            OperatorKind::LessThanOrEqual => "lessThanOrEqual",
            OperatorKind::In => "in",
            OperatorKind::Includes => "includes",
        }
    }

    /// Look up an operator by its wire name. Matching is exact.
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_wire() == name)
    }

    /// Human description of the value shape this operator accepts
    pub fn expected_shape(&self) -> &'static str {
        match self {
            OperatorKind::Equals
            | OperatorKind::GreaterThanOrEqual
            | OperatorKind::LessThanOrEqual => "a string or number",
            OperatorKind::In => "an array of strings",
            OperatorKind::Includes => "a string",
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// The test a condition applies, carrying the value shape its operator needs
#[derive(Debug, Clone, PartialEq)]
pub enum Test {
    /// Row text equals the value (both trimmed)
    Equals(String),
    /// Row value, read as a decimal, is at least the bound
    GreaterThanOrEqual(String),
    /// Row value, read as a decimal, is at most the bound
    LessThanOrEqual(String),
    /// Row text is one of the candidates
    In(Vec<String>),
    /// Row text contains the value (case-sensitive)
    Includes(String),
}

impl Test {
    pub fn operator(&self) -> OperatorKind {
        match self {
            Test::Equals(_) => OperatorKind::Equals,
            Test::GreaterThanOrEqual(_) => OperatorKind::GreaterThanOrEqual,
            Test::LessThanOrEqual(_) => OperatorKind::LessThanOrEqual,
            Test::In(_) => OperatorKind::In,
            Test::Includes(_) => OperatorKind::Includes,
        }
    }
}

/// One field-operator-value test applied to every row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConditionSpec", into = "ConditionSpec")]
pub struct Condition {
    pub field: String,
    pub test: Test,
}

impl Condition {
    pub fn new(field: impl Into<String>, test: Test) -> Self {
        Self {
            field: field.into(),
            test,
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, Test::Equals(value.into()))
    }

    pub fn at_least(field: impl Into<String>, bound: impl Into<String>) -> Self {
        Self::new(field, Test::GreaterThanOrEqual(bound.into()))
    }

    pub fn at_most(field: impl Into<String>, bound: impl Into<String>) -> Self {
        Self::new(field, Test::LessThanOrEqual(bound.into()))
    }

    pub fn one_of<I, S>(field: impl Into<String>, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(field, Test::In(candidates.into_iter().map(Into::into).collect()))
    }

    pub fn includes(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::new(field, Test::Includes(needle.into()))
    }

    pub fn operator(&self) -> OperatorKind {
        self.test.operator()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.test {
            Test::Equals(v) => write!(f, "{} = {:?}", self.field, v),
            Test::GreaterThanOrEqual(v) => write!(f, "{} >= {:?}", self.field, v),
            Test::LessThanOrEqual(v) => write!(f, "{} <= {:?}", self.field, v),
            Test::In(values) => write!(f, "{} IN {:?}", self.field, values),
            Test::Includes(v) => write!(f, "{} CONTAINS {:?}", self.field, v),
        }
    }
}

/// How per-condition results fold into one row-level boolean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    /// Fold lazily produced results. `And` stops at the first `false`,
    /// `Or` at the first `true`. An empty input is `true` for `And` and
    /// `false` for `Or`.
    pub fn fold<I>(self, results: I) -> bool
    where
        I: IntoIterator<Item = bool>,
    {
        let mut results = results.into_iter();
        match self {
            Combinator::And => results.all(|matched| matched),
            Combinator::Or => results.any(|matched| matched),
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::And => f.write_str("and"),
            Combinator::Or => f.write_str("or"),
        }
    }
}
