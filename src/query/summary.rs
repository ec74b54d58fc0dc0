//! Headline figures for a group query

use serde::{Deserialize, Serialize};
use std::fmt;

use super::executor::QueryResult;

/// Counts and match percentage of a query result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_registros: usize,
    pub conteo_cruce: usize,
    /// Share of matching rows, two decimals; `None` for an empty dataset
    pub porcentaje: Option<f64>,
}

impl From<&QueryResult> for Summary {
    fn from(result: &QueryResult) -> Self {
        let porcentaje = (result.total_registros > 0).then(|| {
            let ratio = result.conteo_cruce as f64 / result.total_registros as f64;
            (ratio * 10_000.0).round() / 100.0
        });

        Self {
            total_registros: result.total_registros,
            conteo_cruce: result.conteo_cruce,
            porcentaje,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} rows", self.conteo_cruce, self.total_registros)?;
        match self.porcentaje {
            Some(pct) => write!(f, " ({:.2}%)", pct),
            None => write!(f, " (n/a)"),
        }
    }
}
