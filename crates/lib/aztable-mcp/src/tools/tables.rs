use std::num::NonZeroUsize;

use aztable_core::control::QueryRequest;
use aztable_core::store::TableStore;
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::{AzTableMcp, helpers};

/// Parameters for a bounded table query.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryTableParams {
    /// Name of the table to query.
    pub table_name: String,
    /// OData filter expression, e.g. "PartitionKey eq 'ACTIVE'".
    pub filter: Option<String>,
    /// Property names to return.
    pub select: Option<Vec<String>>,
    /// Maximum number of rows to return. Defaults to 5.
    pub limit: Option<NonZeroUsize>,
}

impl From<QueryTableParams> for QueryRequest {
    fn from(params: QueryTableParams) -> Self {
        Self {
            table_name: params.table_name,
            filter: params.filter,
            select: params.select,
            limit: params.limit.map(NonZeroUsize::get),
        }
    }
}

/// Parameters for schema inference.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetTableSchemaParams {
    /// Name of the table to inspect.
    pub table_name: String,
}

/// Parameters for listing tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ListTablesParams {
    /// Only return tables whose name starts with this prefix.
    pub prefix: Option<String>,
}

#[tool_router(router = tool_router_tables, vis = "pub")]
impl<S: TableStore> AzTableMcp<S> {
    #[tool(description = "Query rows from an Azure Storage table. Returns up to `limit` rows (default 5) \
        plus `totalItems`, the number of rows matching the filter before truncation.")]
    async fn query_table(
        &self,
        Parameters(params): Parameters<QueryTableParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let response = self
            .control
            .query_table(&params.into())
            .await
            .map_err(helpers::map_control_err)?;
        helpers::json_result(&response)
    }

    #[tool(description = "Infer the schema of an Azure Storage table: each property and the value \
        types observed for it. Scans every row, so cost grows with table size.")]
    async fn get_table_schema(
        &self,
        Parameters(params): Parameters<GetTableSchemaParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let schema = self
            .control
            .get_schema(&params.table_name)
            .await
            .map_err(helpers::map_control_err)?;
        helpers::json_result(&schema)
    }

    #[tool(description = "List tables in the Azure Storage account, optionally filtered by name prefix.")]
    async fn list_tables(
        &self,
        Parameters(params): Parameters<ListTablesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let tables = self
            .control
            .list_tables(params.prefix.as_deref())
            .await
            .map_err(helpers::map_control_err)?;
        helpers::json_result(&tables)
    }
}
