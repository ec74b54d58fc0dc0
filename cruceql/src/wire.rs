//! Wire form of group queries and decoding into checked clauses
//!
//! Requests arrive as JSON shaped like:
//!
//! ```json
//! {
//!   "conditions": [
//!     { "field": "Edad", "operator": "greaterThanOrEqual", "value": "40" },
//!     { "field": "Sexo", "operator": "in", "value": ["F"] }
//!   ],
//!   "combinator": "and"
//! }
//! ```
//!
//! Each entry is decoded on its own. An entry whose operator is unknown or
//! whose value has the wrong shape becomes a [`Clause::Rejected`] instead of
//! failing the request, unless the caller asks for [`MalformedPolicy::Reject`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ast::{Combinator, Condition, OperatorKind, Test};
use crate::error::{MalformedCondition, MalformedReason};

/// A condition exactly as the caller wrote it
///
/// Decoding never fails: missing keys, non-text fields and non-text
/// operators are kept in a shape that [`Condition::try_from`] rejects, so
/// one bad entry cannot sink the whole request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct ConditionSpec {
    pub field: String,
    pub operator: String,
    pub value: Value,
}

impl ConditionSpec {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

impl From<Value> for ConditionSpec {
    fn from(raw: Value) -> Self {
        let mut entry = match raw {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };

        // Only text names a column.
        let field = match entry.remove("field") {
            Some(Value::String(s)) => s,
            _ => String::new(),
        };
        let operator = match entry.remove("operator") {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        Self {
            field,
            operator,
            value: entry.remove("value").unwrap_or(Value::Null),
        }
    }
}

impl TryFrom<ConditionSpec> for Condition {
    type Error = MalformedCondition;

    fn try_from(spec: ConditionSpec) -> Result<Self, Self::Error> {
        match decode_test(&spec) {
            Ok(test) => Ok(Condition {
                field: spec.field,
                test,
            }),
            Err(reason) => Err(MalformedCondition { spec, reason }),
        }
    }
}

impl From<Condition> for ConditionSpec {
    fn from(cond: Condition) -> Self {
        let operator = cond.operator().as_wire();
        let value = match cond.test {
            Test::Equals(v)
            | Test::GreaterThanOrEqual(v)
            | Test::LessThanOrEqual(v)
            | Test::Includes(v) => Value::String(v),
            Test::In(values) => Value::Array(values.into_iter().map(Value::String).collect()),
        };
        ConditionSpec {
            field: cond.field,
            operator: operator.to_string(),
            value,
        }
    }
}

fn decode_test(spec: &ConditionSpec) -> Result<Test, MalformedReason> {
    if spec.field.trim().is_empty() {
        return Err(MalformedReason::EmptyField);
    }

    let operator = OperatorKind::from_wire(&spec.operator)
        .ok_or_else(|| MalformedReason::UnknownOperator(spec.operator.clone()))?;
    let shape = || MalformedReason::ValueShape {
        operator,
        expected: operator.expected_shape(),
    };

    match operator {
        OperatorKind::Equals => scalar_text(&spec.value).map(Test::Equals).ok_or_else(shape),
        OperatorKind::GreaterThanOrEqual => scalar_text(&spec.value)
            .map(Test::GreaterThanOrEqual)
            .ok_or_else(shape),
        OperatorKind::LessThanOrEqual => scalar_text(&spec.value)
            .map(Test::LessThanOrEqual)
            .ok_or_else(shape),
        OperatorKind::In => spec
            .value
            .as_array()
            .and_then(|items| {
                items
                    .iter()
                    .map(|item| item.as_str().map(String::from))
                    .collect::<Option<Vec<_>>>()
            })
            .map(Test::In)
            .ok_or_else(shape),
        OperatorKind::Includes => spec
            .value
            .as_str()
            .map(|s| Test::Includes(s.to_string()))
            .ok_or_else(shape),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => match n.as_f64() {
            // `45.0` reads as `45`, the way sheet cells do
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                Some((f as i64).to_string())
            }
            _ => Some(n.to_string()),
        },
        _ => None,
    }
}

/// What to do with a condition that fails to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Keep it as a clause that never matches; the query still runs
    #[default]
    NeverMatch,
    /// Fail the whole query
    Reject,
}

/// A decoded entry of the condition list
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Condition(Condition),
    Rejected(MalformedCondition),
}

impl Clause {
    /// The clause as the caller authored it (for echoing back)
    pub fn spec(&self) -> ConditionSpec {
        match self {
            Clause::Condition(cond) => cond.clone().into(),
            Clause::Rejected(malformed) => malformed.spec.clone(),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Clause::Rejected(_))
    }
}

impl From<Condition> for Clause {
    fn from(cond: Condition) -> Self {
        Clause::Condition(cond)
    }
}

/// A group query request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupQuery {
    #[serde(default)]
    pub conditions: Vec<ConditionSpec>,
    #[serde(default)]
    pub combinator: Combinator,
}

impl GroupQuery {
    pub fn new(combinator: Combinator) -> Self {
        Self {
            conditions: Vec::new(),
            combinator,
        }
    }

    /// Append a well-formed condition
    pub fn with(mut self, cond: Condition) -> Self {
        self.conditions.push(cond.into());
        self
    }

    /// Append a raw condition, which may turn out malformed
    pub fn with_spec(mut self, spec: ConditionSpec) -> Self {
        self.conditions.push(spec);
        self
    }

    /// Decode every condition into a clause according to `policy`
    pub fn clauses(&self, policy: MalformedPolicy) -> Result<Vec<Clause>, MalformedCondition> {
        self.conditions
            .iter()
            .cloned()
            .map(|spec| match Condition::try_from(spec) {
                Ok(cond) => Ok(Clause::Condition(cond)),
                Err(malformed) => match policy {
                    MalformedPolicy::NeverMatch => Ok(Clause::Rejected(malformed)),
                    MalformedPolicy::Reject => Err(malformed),
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_each_operator() {
        let cases = [
            (
                json!({"field": "Sexo", "operator": "equals", "value": "F"}),
                Test::Equals("F".into()),
            ),
            (
                json!({"field": "Edad", "operator": "greaterThanOrEqual", "value": 40}),
                Test::GreaterThanOrEqual("40".into()),
            ),
            (
                json!({"field": "Edad", "operator": "lessThanOrEqual", "value": "60"}),
                Test::LessThanOrEqual("60".into()),
            ),
            (
                json!({"field": "Sexo", "operator": "in", "value": ["F", "M"]}),
                Test::In(vec!["F".into(), "M".into()]),
            ),
            (
                json!({"field": "Diagnostico", "operator": "includes", "value": "arterial"}),
                Test::Includes("arterial".into()),
            ),
        ];

        for (raw, expected) in cases {
            let spec: ConditionSpec = serde_json::from_value(raw).unwrap();
            let cond = Condition::try_from(spec).unwrap();
            assert_eq!(cond.test, expected);
        }
    }

    #[test]
    fn test_in_requires_sequence() {
        let spec = ConditionSpec::new("Sexo", "in", "F");
        let err = Condition::try_from(spec).unwrap_err();
        assert!(matches!(
            err.reason,
            MalformedReason::ValueShape { operator: OperatorKind::In, .. }
        ));
    }

    #[test]
    fn test_in_rejects_non_string_members() {
        let spec = ConditionSpec::new("Sexo", "in", json!(["F", 1]));
        assert!(Condition::try_from(spec).is_err());
    }

    #[test]
    fn test_unknown_operator() {
        let spec = ConditionSpec::new("Edad", "between", "40");
        let err = Condition::try_from(spec).unwrap_err();
        assert_eq!(err.reason, MalformedReason::UnknownOperator("between".into()));
        assert_eq!(err.spec.field, "Edad");
    }

    #[test]
    fn test_empty_field() {
        let spec = ConditionSpec::new("  ", "equals", "x");
        let err = Condition::try_from(spec).unwrap_err();
        assert_eq!(err.reason, MalformedReason::EmptyField);
    }

    #[test]
    fn test_missing_keys_decode_as_malformed() {
        let raw = r#"{"conditions": [{"field": "Edad"}], "combinator": "or"}"#;
        let query: GroupQuery = serde_json::from_str(raw).unwrap();
        let clauses = query.clauses(MalformedPolicy::NeverMatch).unwrap();
        assert_eq!(clauses.len(), 1);
        assert!(clauses[0].is_rejected());
        assert_eq!(query.combinator, Combinator::Or);
    }

    #[test]
    fn test_mistyped_keys_cost_only_their_condition() {
        let query: GroupQuery = serde_json::from_value(json!({
            "conditions": [
                { "field": "Sexo", "operator": "equals", "value": "F" },
                { "field": "Edad", "operator": null, "value": "40" },
                { "field": 7, "operator": "equals", "value": "F" },
                { "field": "Edad", "operator": 3, "value": "40" },
                "Sexo = F"
            ],
            "combinator": "or"
        }))
        .unwrap();

        let clauses = query.clauses(MalformedPolicy::NeverMatch).unwrap();
        assert_eq!(clauses.len(), 5);
        assert!(!clauses[0].is_rejected());
        assert!(clauses[1..].iter().all(Clause::is_rejected));

        let reasons: Vec<_> = clauses[1..]
            .iter()
            .map(|clause| match clause {
                Clause::Rejected(malformed) => malformed.reason.clone(),
                Clause::Condition(cond) => panic!("unexpected condition {}", cond),
            })
            .collect();
        assert_eq!(
            reasons,
            [
                MalformedReason::UnknownOperator(String::new()),
                MalformedReason::EmptyField,
                MalformedReason::UnknownOperator("3".into()),
                MalformedReason::EmptyField,
            ]
        );
    }

    #[test]
    fn test_integral_float_values_read_as_integers() {
        let spec: ConditionSpec =
            serde_json::from_value(json!({"field": "Edad", "operator": "equals", "value": 45.0}))
                .unwrap();
        assert_eq!(Condition::try_from(spec).unwrap().test, Test::Equals("45".into()));

        let spec = ConditionSpec::new("Peso", "lessThanOrEqual", 72.5);
        let cond = Condition::try_from(spec).unwrap();
        assert_eq!(cond.test, Test::LessThanOrEqual("72.5".into()));
    }

    #[test]
    fn test_policy_reject_fails_query() {
        let query = GroupQuery::new(Combinator::And)
            .with(Condition::equals("Sexo", "F"))
            .with_spec(ConditionSpec::new("Edad", "greaterThan", "40"));

        assert!(query.clauses(MalformedPolicy::Reject).is_err());

        let clauses = query.clauses(MalformedPolicy::NeverMatch).unwrap();
        assert!(!clauses[0].is_rejected());
        assert!(clauses[1].is_rejected());
    }

    #[test]
    fn test_default_combinator_is_and() {
        let query: GroupQuery = serde_json::from_str(r#"{"conditions": []}"#).unwrap();
        assert_eq!(query.combinator, Combinator::And);
    }

    #[test]
    fn test_condition_serializes_as_spec() {
        let cond = Condition::one_of("Sexo", ["F"]);
        let value = serde_json::to_value(&cond).unwrap();
        assert_eq!(value, json!({"field": "Sexo", "operator": "in", "value": ["F"]}));

        let back: Condition = serde_json::from_value(value).unwrap();
        assert_eq!(back, cond);
    }
}
