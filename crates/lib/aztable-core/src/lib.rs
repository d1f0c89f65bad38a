//! Core services for aztable-mcp.
//!
//! This crate owns the seam to Azure Table Storage (`store`) and the control
//! plane that turns tool requests into bounded query, schema, and listing
//! results (`control`).

pub mod control;
pub mod store;
