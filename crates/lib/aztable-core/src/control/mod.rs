use std::sync::Arc;

use thiserror::Error;

use crate::store::{StoreError, TableStore};

pub mod metadata;
pub mod rows;

pub use rows::QueryRequest;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Read-only operations over a table store.
pub struct TableControlPlane<S: TableStore> {
    store: Arc<S>,
}

impl<S: TableStore> Clone for TableControlPlane<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: TableStore> TableControlPlane<S> {
    pub fn new(store: S) -> Self {
        Self::from_arc(Arc::new(store))
    }

    pub const fn from_arc(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn require_table_name(table_name: &str) -> Result<&str, ControlError> {
    if table_name.trim().is_empty() {
        return Err(ControlError::InvalidArgument(
            "tableName is required and must be a non-empty string".to_string(),
        ));
    }
    Ok(table_name)
}
