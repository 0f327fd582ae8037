//! Statement and mapping-table ingestion for the liquidity engine.
//!
//! This crate handles:
//! - Reading balance-sheet statements (long or wide CSV, latest period)
//! - Loading the label-to-Basel-category mapping table
//! - The `MappingSource` seam the category mapper loads tables through

pub mod mapping_table;
pub mod statement;

pub use mapping_table::{load_mapping_table, CsvMappingSource, MappingSource};
pub use statement::{Statement, StatementReader};
