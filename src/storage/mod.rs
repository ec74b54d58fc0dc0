//! Storage layer for cruce
//!
//! Handles reading and writing sheets of records from a workbook directory.

pub mod record;
pub mod sheet;
