//! Store interfaces and the Azure Table Storage implementation.
//!
//! The store layer enumerates tables and entities. Filters and projections are
//! handed to the backend untouched; evaluating them is the backend's job.

pub mod azure;
#[cfg(any(test, feature = "test-util"))]
pub mod fake;
pub mod odata;

use async_trait::async_trait;
use aztable_store::Entity;
use thiserror::Error;

pub use azure::AzureTableStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Azure(Box<azure_core::Error>),
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),
    #[error("{0}")]
    Backend(String),
}

impl From<azure_core::Error> for StoreError {
    fn from(err: azure_core::Error) -> Self {
        Self::Azure(Box::new(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Filter and projection applied to an entity scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityQuery {
    /// Predicate in the store's native filter language.
    pub filter: Option<String>,
    /// Field names to project.
    pub select: Option<Vec<String>>,
}

impl EntityQuery {
    /// A scan of every entity with every field.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
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
}

/// Read-only access to a tabular store.
///
/// Implementations return complete result sets, following continuation pages
/// until the backend reports no more data.
#[async_trait]
pub trait TableStore: Send + Sync + 'static {
    /// Returns every entity in `table` matching `query`.
    ///
    /// # Errors
    /// Returns `StoreError` if the table does not exist, the filter is
    /// rejected, or the backend call fails.
    async fn query_entities(&self, table: &str, query: &EntityQuery) -> StoreResult<Vec<Entity>>;

    /// Returns the name of every table in the account.
    ///
    /// # Errors
    /// Returns `StoreError` if the backend call fails.
    async fn list_tables(&self) -> StoreResult<Vec<String>>;
}
