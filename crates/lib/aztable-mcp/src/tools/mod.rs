//! MCP tool modules.
//!
//! All tools are read-only: table listing, schema inference, and bounded
//! row queries.

pub mod tables;
