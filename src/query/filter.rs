//! Per-condition evaluation against a single record

use cruceql::{Clause, Condition, Test};

use crate::storage::record::{parse_decimal, Record};

/// Evaluate a clause against a record. Rejected clauses never match.
pub fn evaluate(clause: &Clause, record: &Record) -> bool {
    match clause {
        Clause::Condition(cond) => matches(cond, record),
        Clause::Rejected(_) => false,
    }
}

/// Evaluate a well-formed condition against a record
pub fn matches(cond: &Condition, record: &Record) -> bool {
    let cell = record.text(&cond.field);

    match &cond.test {
        Test::Equals(expected) => cell.trim() == expected.trim(),
        Test::GreaterThanOrEqual(bound) => {
            compare_numeric(record, &cond.field, bound, |a, b| a >= b)
        }
        Test::LessThanOrEqual(bound) => {
            compare_numeric(record, &cond.field, bound, |a, b| a <= b)
        }
        Test::In(candidates) => {
            let cell = cell.trim();
            candidates.iter().any(|candidate| candidate.trim() == cell)
        }
        Test::Includes(needle) => cell.contains(needle.as_str()),
    }
}

/// Both sides must read as decimals; otherwise the row does not match
fn compare_numeric<F>(record: &Record, field: &str, bound: &str, cmp: F) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    let value = record.get(field).and_then(|v| v.as_number());
    match (value, parse_decimal(bound)) {
        (Some(value), Some(bound)) => cmp(value, bound),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cruceql::{ConditionSpec, MalformedReason};

    fn make_record() -> Record {
        Record::new()
            .with("Sexo", "F")
            .with("Edad", "45")
            .with("Peso (kg)", 72.5)
            .with("Diagnostico", "Hipertensión arterial")
            .with("DNI", " 30111222 ")
    }

    #[test]
    fn test_equals_trims_both_sides() {
        let record = make_record();
        assert!(matches(&Condition::equals("DNI", "30111222 "), &record));
        assert!(matches(&Condition::equals("Sexo", "F"), &record));
        assert!(!matches(&Condition::equals("Sexo", "f"), &record));
    }

    #[test]
    fn test_equals_on_numeric_cell() {
        let record = Record::new().with("Edad", 45.0);
        assert!(matches(&Condition::equals("Edad", "45"), &record));
    }

    #[test]
    fn test_equals_empty_matches_absent_field() {
        let record = make_record();
        assert!(matches(&Condition::equals("Ausente", ""), &record));
    }

    #[test]
    fn test_numeric_bounds() {
        let record = make_record();
        assert!(matches(&Condition::at_least("Edad", "45"), &record));
        assert!(matches(&Condition::at_most("Edad", "45.0"), &record));
        assert!(!matches(&Condition::at_least("Edad", "46"), &record));
        assert!(matches(&Condition::at_least("Peso (kg)", "70"), &record));
    }

    #[test]
    fn test_numeric_compares_as_numbers_not_text() {
        let record = Record::new().with("Edad", "9");
        assert!(matches(&Condition::at_most("Edad", "10"), &record));
    }

    #[test]
    fn test_non_numeric_never_matches() {
        let record = Record::new().with("Edad", "desconocido");
        assert!(!matches(&Condition::at_least("Edad", "0"), &record));
        assert!(!matches(&Condition::at_most("Edad", "1000"), &record));

        let record = make_record();
        assert!(!matches(&Condition::at_least("Edad", "cuarenta"), &record));
        assert!(!matches(&Condition::at_least("Ausente", "0"), &record));
    }

    #[test]
    fn test_in_membership() {
        let record = Record::new().with("Grupo", "B");
        assert!(matches(&Condition::one_of("Grupo", ["A", "B", "C"]), &record));
        assert!(!matches(&Condition::one_of("Grupo", ["A", "C"]), &record));
        assert!(!matches(&Condition::one_of("Grupo", Vec::<String>::new()), &record));
    }

    #[test]
    fn test_includes_is_case_sensitive_substring() {
        let record = make_record();
        assert!(matches(&Condition::includes("Diagnostico", "arterial"), &record));
        assert!(!matches(&Condition::includes("Diagnostico", "Arterial"), &record));
        assert!(matches(&Condition::includes("Diagnostico", "tensión"), &record));
    }

    #[test]
    fn test_rejected_clause_never_matches() {
        let record = make_record();
        let malformed =
            Condition::try_from(ConditionSpec::new("Sexo", "in", "F")).unwrap_err();
        assert!(matches!(malformed.reason, MalformedReason::ValueShape { .. }));
        assert!(!evaluate(&Clause::Rejected(malformed), &record));
    }
}
