//! Condition language for cruce group queries
//!
//! A group query is a flat list of field-operator-value conditions folded
//! with a single combinator. There is no nesting and no per-pair combinator.
//!
//! # Operators
//!
//! | wire name            | text form         | value shape        |
//! |----------------------|-------------------|--------------------|
//! | `equals`             | `Sexo = F`        | string or number   |
//! | `greaterThanOrEqual` | `Edad >= 40`      | string or number   |
//! | `lessThanOrEqual`    | `Edad <= 60`      | string or number   |
//! | `in`                 | `Sexo IN [F, M]`  | array of strings   |
//! | `includes`           | `Dx CONTAINS 'x'` | string             |
//!
//! Field names with spaces or punctuation are quoted in the text form:
//! `"Peso (kg)" >= 80`.

mod ast;
mod error;
mod parser;
mod wire;

pub use ast::*;
pub use error::{MalformedCondition, MalformedReason, ParseError};
pub use wire::{Clause, ConditionSpec, GroupQuery, MalformedPolicy};

/// Parse one textual condition
pub fn parse(input: &str) -> Result<Condition, ParseError> {
    parser::parse_condition(input)
}

/// Parse textual conditions separated by semicolons
pub fn parse_multi(input: &str) -> Result<Vec<Condition>, ParseError> {
    parser::parse_conditions(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_then_serialize() {
        let cond = parse("Edad >= 40").unwrap();
        let spec = ConditionSpec::from(cond);
        assert_eq!(spec.operator, "greaterThanOrEqual");
        assert_eq!(spec.value, serde_json::Value::String("40".into()));
    }

    #[test]
    fn test_parse_multi_into_query() {
        let query = parse_multi("Edad >= 40; Sexo IN [F]")
            .unwrap()
            .into_iter()
            .fold(GroupQuery::new(Combinator::Or), GroupQuery::with);

        assert_eq!(query.conditions.len(), 2);
        assert_eq!(query.combinator, Combinator::Or);
        let clauses = query.clauses(MalformedPolicy::Reject).unwrap();
        assert!(clauses.iter().all(|c| !c.is_rejected()));
    }
}
