//! Data profiling module.
//!
//! Classifies the columns of a prepared table into feature roles.

mod schema;

pub use schema::{ColumnRole, ColumnSchema, ColumnSpec, ExcludedColumn, ExclusionReason};
