//! Group query execution

use cruceql::{Clause, Combinator, ConditionSpec, GroupQuery, MalformedPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::filter;
use crate::error::Result;
use crate::storage::record::Record;

/// Result of a group query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Size of the input dataset
    pub total_registros: usize,
    /// Rows satisfying the combined predicate
    pub conteo_cruce: usize,
    /// The criteria as received, rejected ones included
    pub criterios_cruce: Vec<ConditionSpec>,
    /// Matching rows, in dataset order
    pub data: Vec<Record>,
}

/// Fold every clause with `combinator` for each row and collect the matches.
///
/// With no clauses, `And` matches every row and `Or` matches none.
pub fn evaluate_group(
    dataset: &[Record],
    clauses: &[Clause],
    combinator: Combinator,
) -> QueryResult {
    let criterios = clauses.iter().map(Clause::spec).collect();
    collect_matches(dataset, clauses, combinator, criterios)
}

fn collect_matches(
    dataset: &[Record],
    clauses: &[Clause],
    combinator: Combinator,
    criterios_cruce: Vec<ConditionSpec>,
) -> QueryResult {
    let data: Vec<Record> = dataset
        .iter()
        .filter(|record| {
            combinator.fold(clauses.iter().map(|clause| filter::evaluate(clause, record)))
        })
        .cloned()
        .collect();

    QueryResult {
        total_registros: dataset.len(),
        conteo_cruce: data.len(),
        criterios_cruce,
        data,
    }
}

/// Decode a wire query under `policy` and evaluate it. The criteria are
/// echoed exactly as the request carried them.
pub fn execute(
    dataset: &[Record],
    query: &GroupQuery,
    policy: MalformedPolicy,
) -> Result<QueryResult> {
    let clauses = query.clauses(policy)?;

    for clause in &clauses {
        if let Clause::Rejected(malformed) = clause {
            tracing::warn!(
                field = %malformed.spec.field,
                operator = %malformed.spec.operator,
                reason = %malformed.reason,
                "condition will never match"
            );
        }
    }

    tracing::debug!(
        rows = dataset.len(),
        conditions = clauses.len(),
        combinator = %query.combinator,
        "evaluating group query"
    );

    let criterios = query.conditions.clone();
    Ok(collect_matches(dataset, &clauses, query.combinator, criterios))
}

/// Distinct non-blank values of `field`, trimmed, in order of first occurrence
pub fn distinct_values(dataset: &[Record], field: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut values = Vec::new();

    for record in dataset {
        let text = record.text(field);
        let text = text.trim();
        if text.is_empty() || seen.contains(text) {
            continue;
        }
        seen.insert(text.to_string());
        values.push(text.to_string());
    }

    values
}
