//! Group query engine
//!
//! Evaluates a flat list of conditions over a dataset of records and reports
//! which rows satisfy them under an AND/OR combinator.

mod executor;
pub mod filter;
mod summary;

pub use executor::{distinct_values, evaluate_group, execute, QueryResult};
pub use summary::Summary;
