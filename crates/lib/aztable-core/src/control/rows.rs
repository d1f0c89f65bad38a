use aztable_store::schema::DEFAULT_QUERY_LIMIT;
use aztable_store::{QueryResponse, TableSchema};
use tracing::{debug, warn};

use super::{ControlError, TableControlPlane, require_table_name};
use crate::store::{EntityQuery, TableStore};

/// A bounded query against a single table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRequest {
    pub table_name: String,
    /// Passed to the store untouched.
    pub filter: Option<String>,
    /// Passed to the store untouched.
    pub select: Option<Vec<String>>,
    /// Defaults to `DEFAULT_QUERY_LIMIT`.
    pub limit: Option<usize>,
}

impl QueryRequest {
    #[must_use]
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_select(mut self, select: Vec<String>) -> Self {
        self.select = Some(select);
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn entity_query(&self) -> EntityQuery {
        let mut query = EntityQuery::all();
        if let Some(filter) = self.filter.as_deref().filter(|value| !value.is_empty()) {
            query = query.with_filter(filter);
        }
        if let Some(select) = self.select.as_ref().filter(|fields| !fields.is_empty()) {
            query = query.with_select(select.clone());
        }
        query
    }
}

impl<S: TableStore> TableControlPlane<S> {
    /// Runs a query and returns at most `limit` rows.
    ///
    /// The whole match set is read before truncation so that `total_items`
    /// reports the true number of matching rows.
    ///
    /// # Errors
    /// Returns `ControlError::InvalidArgument` for an empty table name or a
    /// zero limit (no store call is made), and `ControlError::Store` if the
    /// store rejects the query.
    pub async fn query_table(&self, request: &QueryRequest) -> Result<QueryResponse, ControlError> {
        let table = require_table_name(&request.table_name)?;
        let limit = request.limit.unwrap_or(DEFAULT_QUERY_LIMIT);
        if limit == 0 {
            return Err(ControlError::InvalidArgument(
                "limit must be a positive integer".to_string(),
            ));
        }

        let query = request.entity_query();
        let rows = self
            .store
            .query_entities(table, &query)
            .await
            .inspect_err(|err| warn!(table, error = %err, "table query failed"))?;
        debug!(
            table,
            filter = query.filter.as_deref(),
            matched = rows.len(),
            limit,
            "table query complete"
        );
        Ok(QueryResponse::truncate(rows, limit))
    }

    /// Infers a schema by scanning every row of a table.
    ///
    /// The scan is unbounded, so cost grows with table size.
    ///
    /// # Errors
    /// Returns `ControlError::InvalidArgument` for an empty table name and
    /// `ControlError::Store` if the scan fails.
    pub async fn get_schema(&self, table_name: &str) -> Result<TableSchema, ControlError> {
        let table = require_table_name(table_name)?;
        let rows = self
            .store
            .query_entities(table, &EntityQuery::all())
            .await
            .inspect_err(|err| warn!(table, error = %err, "schema scan failed"))?;
        let schema: TableSchema = rows.iter().collect();
        debug!(table, scanned = rows.len(), fields = schema.len(), "schema inferred");
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fake::FakeTableStore;
    use aztable_store::{Entity, EntityValue, TypeTag};

    const ACTIVE_FILTER: &str = "PartitionKey eq 'ACTIVE'";

    fn user(partition: &str, id: i64) -> Entity {
        Entity::from([
            ("PartitionKey".to_string(), EntityValue::from(partition)),
            ("RowKey".to_string(), EntityValue::from(id.to_string())),
            ("Visits".to_string(), EntityValue::from(id)),
        ])
    }

    fn users_store() -> FakeTableStore {
        let mut rows: Vec<Entity> = (0..25).map(|id| user("ACTIVE", id)).collect();
        rows.extend((100..110).map(|id| user("INACTIVE", id)));
        FakeTableStore::new()
            .with_table("Users", rows)
            .with_filter(ACTIVE_FILTER, |row| {
                row.get("PartitionKey") == Some(&EntityValue::from("ACTIVE"))
            })
    }

    #[tokio::test]
    async fn query_reports_total_matches_and_default_limit() {
        let control = TableControlPlane::new(users_store());

        let response = control
            .query_table(&QueryRequest::new("Users").with_filter(ACTIVE_FILTER))
            .await
            .expect("query should succeed");

        assert_eq!(response.total_items, 25);
        assert_eq!(response.limit, DEFAULT_QUERY_LIMIT);
        assert_eq!(response.items.len(), 5);
        assert_eq!(response.items[0], user("ACTIVE", 0));
        assert_eq!(response.items[4], user("ACTIVE", 4));
    }

    #[tokio::test]
    async fn omitted_limit_matches_explicit_default() {
        let control = TableControlPlane::new(users_store());

        let implicit = control.query_table(&QueryRequest::new("Users")).await.unwrap();
        let explicit = control
            .query_table(&QueryRequest::new("Users").with_limit(5))
            .await
            .unwrap();

        assert_eq!(implicit, explicit);
    }

    #[tokio::test]
    async fn items_never_exceed_limit_or_total() {
        let control = TableControlPlane::new(users_store());

        for limit in [1, 5, 25, 35, 100] {
            let response = control
                .query_table(&QueryRequest::new("Users").with_limit(limit))
                .await
                .unwrap();
            assert_eq!(response.total_items, 35);
            assert!(response.items.len() <= limit);
            assert!(response.items.len() <= response.total_items);
        }
    }

    #[tokio::test]
    async fn filter_and_select_pass_through_verbatim() {
        let control = TableControlPlane::new(users_store());
        let select = vec!["RowKey".to_string()];

        let response = control
            .query_table(
                &QueryRequest::new("Users")
                    .with_filter(ACTIVE_FILTER)
                    .with_select(select.clone())
                    .with_limit(2),
            )
            .await
            .unwrap();

        let (table, query) = control.store().last_query().expect("store was called");
        assert_eq!(table, "Users");
        assert_eq!(query.filter.as_deref(), Some(ACTIVE_FILTER));
        assert_eq!(query.select, Some(select));
        assert!(response.items.iter().all(|row| row.len() == 1));
    }

    #[tokio::test]
    async fn empty_filter_and_select_are_omitted() {
        let control = TableControlPlane::new(users_store());

        control
            .query_table(&QueryRequest::new("Users").with_filter("").with_select(Vec::new()))
            .await
            .unwrap();

        let (_, query) = control.store().last_query().unwrap();
        assert_eq!(query, EntityQuery::all());
    }

    #[tokio::test]
    async fn invalid_arguments_skip_the_store() {
        let control = TableControlPlane::new(users_store());

        let empty = control.query_table(&QueryRequest::new("  ")).await;
        let zero = control
            .query_table(&QueryRequest::new("Users").with_limit(0))
            .await;
        let schema = control.get_schema("").await;

        assert!(matches!(empty, Err(ControlError::InvalidArgument(_))));
        assert!(matches!(zero, Err(ControlError::InvalidArgument(_))));
        assert!(matches!(schema, Err(ControlError::InvalidArgument(_))));
        assert_eq!(control.store().calls(), 0);
    }

    #[tokio::test]
    async fn store_errors_keep_their_message() {
        let control = TableControlPlane::new(users_store());

        let missing = control.query_table(&QueryRequest::new("Orders")).await;
        let malformed = control
            .query_table(&QueryRequest::new("Users").with_filter("PartitionKey eq"))
            .await;

        let missing = missing.expect_err("unknown table should fail");
        assert!(matches!(missing, ControlError::Store(_)));
        assert_eq!(
            missing.to_string(),
            "TableNotFound: The table specified does not exist. (Orders)"
        );
        assert!(matches!(malformed, Err(ControlError::Store(_))));
    }

    #[tokio::test]
    async fn schema_collects_tags_across_rows() {
        let rows = vec![
            Entity::from([("a".to_string(), EntityValue::from("x"))]),
            Entity::from([
                ("a".to_string(), EntityValue::from(1_i64)),
                ("b".to_string(), EntityValue::Null),
            ]),
        ];
        let control = TableControlPlane::new(FakeTableStore::new().with_table("Mixed", rows));

        let schema = control.get_schema("Mixed").await.unwrap();

        assert_eq!(schema.tags("a"), Some(&[TypeTag::String, TypeTag::Number][..]));
        assert_eq!(schema.tags("b"), Some(&[TypeTag::Null][..]));
        let (_, query) = control.store().last_query().unwrap();
        assert_eq!(query, EntityQuery::all());
    }
}
