use tracing::{debug, warn};

use super::{ControlError, TableControlPlane};
use crate::store::TableStore;

impl<S: TableStore> TableControlPlane<S> {
    /// Lists table names, keeping only those starting with `prefix` when given.
    ///
    /// # Errors
    /// Returns `ControlError::Store` if table enumeration fails.
    pub async fn list_tables(&self, prefix: Option<&str>) -> Result<Vec<String>, ControlError> {
        let mut names = self
            .store
            .list_tables()
            .await
            .inspect_err(|err| warn!(error = %err, "table listing failed"))?;
        if let Some(prefix) = prefix {
            names.retain(|name| name.starts_with(prefix));
        }
        debug!(prefix, tables = names.len(), "tables listed");
        Ok(names)
    }
}
