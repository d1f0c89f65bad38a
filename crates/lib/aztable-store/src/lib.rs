//! Data model for aztable-mcp.
//!
//! Rows read from Azure Table Storage are open mappings from field name to a
//! dynamically typed scalar. This crate defines that value type along with the
//! response shapes returned by the query, schema, and listing tools.

pub mod models;
pub mod schema;

pub use models::*;
