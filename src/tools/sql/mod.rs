//! SQL tools module
//!
//! Tools for listing tables, reading schemas, checking and running queries.

mod checker;
mod list_tables;
mod query;
mod schema;

pub use checker::QueryCheckerTool;
pub use list_tables::ListTablesTool;
pub use query::{format_rows, QueryTool};
pub use schema::SchemaTool;
