//! In-memory table store for tests.
//!
//! Filters are opaque strings here just as they are for the real service: a
//! test registers a predicate for each filter string it intends to send, and
//! any other filter is rejected the way the service rejects a malformed one.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use aztable_store::Entity;

use super::{EntityQuery, StoreError, StoreResult, TableStore};

type Predicate = Arc<dyn Fn(&Entity) -> bool + Send + Sync>;

#[derive(Default)]
pub struct FakeTableStore {
    tables: BTreeMap<String, Vec<Entity>>,
    filters: HashMap<String, Predicate>,
    calls: AtomicUsize,
    queries: Mutex<Vec<(String, EntityQuery)>>,
}

impl FakeTableStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_table(mut self, name: impl Into<String>, rows: Vec<Entity>) -> Self {
        self.tables.insert(name.into(), rows);
        self
    }

    #[must_use]
    pub fn with_filter(
        mut self,
        filter: impl Into<String>,
        predicate: impl Fn(&Entity) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.filters.insert(filter.into(), Arc::new(predicate));
        self
    }

    /// Number of store calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent entity query, with its table name.
    pub fn last_query(&self) -> Option<(String, EntityQuery)> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

#[async_trait]
impl TableStore for FakeTableStore {
    async fn query_entities(&self, table: &str, query: &EntityQuery) -> StoreResult<Vec<Entity>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((table.to_string(), query.clone()));

        let rows = self.tables.get(table).ok_or_else(|| {
            StoreError::Backend(format!(
                "TableNotFound: The table specified does not exist. ({table})"
            ))
        })?;
        let predicate = match &query.filter {
            Some(filter) => Some(self.filters.get(filter).ok_or_else(|| {
                StoreError::Backend(format!(
                    "InvalidInput: One of the request inputs is not valid. ({filter})"
                ))
            })?),
            None => None,
        };

        Ok(rows
            .iter()
            .filter(|row| predicate.is_none_or(|keep| keep(*row)))
            .map(|row| project(row, query.select.as_deref()))
            .collect())
    }

    async fn list_tables(&self) -> StoreResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.tables.keys().cloned().collect())
    }
}

fn project(row: &Entity, select: Option<&[String]>) -> Entity {
    match select {
        Some(fields) => row
            .iter()
            .filter(|(name, _)| fields.contains(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect(),
        None => row.clone(),
    }
}
