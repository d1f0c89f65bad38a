use async_trait::async_trait;
use azure_data_tables::clients::TableServiceClientBuilder;
use azure_data_tables::prelude::{Filter, Select, TableServiceClient};
use azure_storage::{CloudLocation, ConnectionString};
use aztable_store::Entity;
use futures::StreamExt;
use serde_json::{Map, Value};

use super::{EntityQuery, StoreError, StoreResult, TableStore, odata};

/// Table store backed by an Azure Storage account (or the Azurite emulator).
#[derive(Clone)]
pub struct AzureTableStore {
    service: TableServiceClient,
}

impl AzureTableStore {
    #[must_use]
    pub const fn new(service: TableServiceClient) -> Self {
        Self { service }
    }

    /// Builds a store from an Azure Storage connection string.
    ///
    /// `UseDevelopmentStorage=true` targets the local emulator. An explicit
    /// `TableEndpoint` overrides the endpoint derived from the account name.
    ///
    /// # Errors
    /// Returns `StoreError` if the connection string cannot be parsed or does
    /// not carry usable credentials.
    pub fn from_connection_string(connection_string: &str) -> StoreResult<Self> {
        let parsed = ConnectionString::new(connection_string)?;
        if parsed.use_development_storage == Some(true) {
            return Ok(Self::new(TableServiceClientBuilder::emulator().build()));
        }

        let account = parsed.account_name.ok_or_else(|| {
            StoreError::InvalidConnectionString("missing AccountName".to_string())
        })?;
        let credentials = parsed.storage_credentials()?;
        let mut builder = TableServiceClientBuilder::new(account, credentials);
        if let Some(endpoint) = parsed.table_endpoint {
            builder = builder.cloud_location(CloudLocation::Custom {
                account: account.to_string(),
                uri: endpoint.trim_end_matches('/').to_string(),
            });
        }
        Ok(Self::new(builder.build()))
    }
}

#[async_trait]
impl TableStore for AzureTableStore {
    async fn query_entities(&self, table: &str, query: &EntityQuery) -> StoreResult<Vec<Entity>> {
        let client = self.service.table_client(table);
        let mut builder = client.query();
        if let Some(filter) = &query.filter {
            builder = builder.filter(Filter::new(filter.clone()));
        }
        if let Some(select) = &query.select {
            builder = builder.select(Select::new(select.join(",")));
        }

        let mut pages = builder.into_stream::<Map<String, Value>>();
        let mut rows = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page?;
            rows.extend(page.entities.iter().map(odata::decode_entity));
        }
        Ok(rows)
    }

    async fn list_tables(&self) -> StoreResult<Vec<String>> {
        let mut pages = self.service.list().into_stream();
        let mut names = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page?;
            names.extend(page.tables.into_iter().map(|table| table.name));
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_sentinel_builds_emulator_store() {
        let store = AzureTableStore::from_connection_string(
            aztable_store::schema::DEVELOPMENT_CONNECTION_STRING,
        );
        assert!(store.is_ok());
    }

    #[test]
    fn account_key_connection_string_builds_store() {
        let store = AzureTableStore::from_connection_string(
            "DefaultEndpointsProtocol=https;AccountName=devacct;AccountKey=ZGV2a2V5;EndpointSuffix=core.windows.net",
        );
        assert!(store.is_ok());
    }

    #[test]
    fn rejects_garbage_connection_string() {
        let store = AzureTableStore::from_connection_string("not a connection string");
        assert!(store.is_err());
    }
}
