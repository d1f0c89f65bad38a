//! MCP server implementation for aztable-mcp.
//!
//! This crate wires the table control plane into rmcp tool handlers and exposes
//! the read-only query, schema, and listing tools.

mod helpers;
mod tools;
pub mod server;

use aztable_core::control::TableControlPlane;
use aztable_core::store::TableStore;
use rmcp::{
    ErrorData,
    RoleServer,
    ServerHandler,
    handler::server::tool::{ToolCallContext, ToolRouter},
    service::RequestContext,
};
use rmcp::model::{
    CallToolRequestParams,
    CallToolResult,
    ErrorCode,
    ListToolsResult,
    PaginatedRequestParams,
    ServerCapabilities,
    ServerInfo,
};

pub use tools::tables::{GetTableSchemaParams, ListTablesParams, QueryTableParams};

const SERVER_INSTRUCTIONS: &str = r"aztable-mcp provides read-only access to Azure Table Storage.

Tools:
- `list_tables` lists table names, optionally only those starting with `prefix` (case-sensitive).
- `get_table_schema` infers a schema for `tableName`: each property maps to the value types seen
  (string, number, boolean, date, null). It reads every row of the table, so it is slow on large tables.
- `query_table` returns up to `limit` rows (default 5) of `tableName`. `totalItems` is the number of
  rows that matched before truncation, so compare it with `limit` to see whether more data exists.

Notes:
- `filter` is an OData filter expression evaluated by the table service, for example
  `PartitionKey eq 'ACTIVE' and Age gt 30`. It is sent as-is.
- `select` lists the property names to return and is sent as-is.";

/// MCP server wrapper around the table control plane.
pub struct AzTableMcp<S: TableStore> {
    tool_router: ToolRouter<Self>,
    control: TableControlPlane<S>,
}

impl<S: TableStore> Clone for AzTableMcp<S> {
    fn clone(&self) -> Self {
        Self {
            tool_router: self.tool_router.clone(),
            control: self.control.clone(),
        }
    }
}

impl<S: TableStore> AzTableMcp<S> {
    #[must_use]
    pub fn new(control: TableControlPlane<S>) -> Self {
        Self {
            tool_router: Self::tool_router_tables(),
            control,
        }
    }

    pub const fn control(&self) -> &TableControlPlane<S> {
        &self.control
    }

    /// Rejects tool names that have no registered handler.
    fn ensure_tool(&self, name: &str) -> Result<(), ErrorData> {
        if self.tool_router.has_route(name) {
            Ok(())
        } else {
            Err(helpers::mcp_err(
                ErrorCode::METHOD_NOT_FOUND,
                format!("unknown tool: {name}"),
            ))
        }
    }
}

impl<S: TableStore> ServerHandler for AzTableMcp<S> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.tool_router.list_all()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        self.ensure_tool(&request.name)?;
        let call = ToolCallContext::new(self, request, context);
        self.tool_router.call(call).await
    }
}
