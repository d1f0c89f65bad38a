use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A single scalar property value read from a table entity.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum EntityValue {
    String(String),
    Number(Number),
    Boolean(bool),
    Date(DateTime<Utc>),
    Null,
}

impl EntityValue {
    /// Returns the runtime type tag used for schema inference.
    #[must_use]
    pub const fn type_tag(&self) -> TypeTag {
        match self {
            Self::String(_) => TypeTag::String,
            Self::Number(_) => TypeTag::Number,
            Self::Boolean(_) => TypeTag::Boolean,
            Self::Date(_) => TypeTag::Date,
            Self::Null => TypeTag::Null,
        }
    }
}

impl From<&str> for EntityValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for EntityValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for EntityValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<bool> for EntityValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<DateTime<Utc>> for EntityValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

/// Runtime classification of an [`EntityValue`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    String,
    Number,
    Boolean,
    Date,
    Null,
}

/// A table row: field name to value, ordered by field name.
pub type Entity = BTreeMap<String, EntityValue>;

/// Bounded result of a table query.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    /// Number of rows that matched the filter before truncation.
    pub total_items: usize,
    /// Limit applied to `items`.
    pub limit: usize,
    pub items: Vec<Entity>,
}

impl QueryResponse {
    /// Builds a response from the full match set, keeping the first `limit` rows.
    #[must_use]
    pub fn truncate(mut rows: Vec<Entity>, limit: usize) -> Self {
        let total_items = rows.len();
        rows.truncate(limit);
        Self {
            total_items,
            limit,
            items: rows,
        }
    }
}

/// Schema inferred from observed rows.
///
/// Each field maps to the distinct type tags seen for it, in order of first
/// observation. Rows that lack a field do not contribute to it.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct TableSchema {
    fields: BTreeMap<String, Vec<TypeTag>>,
}

impl TableSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the type of every field present on `entity`.
    pub fn observe(&mut self, entity: &Entity) {
        for (name, value) in entity {
            let tag = value.type_tag();
            let tags = self.fields.entry(name.clone()).or_default();
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }

    #[must_use]
    pub fn tags(&self, field: &str) -> Option<&[TypeTag]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> FromIterator<&'a Entity> for TableSchema {
    fn from_iter<I: IntoIterator<Item = &'a Entity>>(iter: I) -> Self {
        let mut schema = Self::new();
        for entity in iter {
            schema.observe(entity);
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn entity(fields: &[(&str, EntityValue)]) -> Entity {
        fields
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn schema_accumulates_heterogeneous_tags_in_first_seen_order() {
        let rows = [
            entity(&[("a", "x".into())]),
            entity(&[("a", 1_i64.into())]),
            entity(&[("a", "y".into()), ("b", true.into())]),
        ];

        let schema: TableSchema = rows.iter().collect();

        assert_eq!(schema.tags("a"), Some(&[TypeTag::String, TypeTag::Number][..]));
        assert_eq!(schema.tags("b"), Some(&[TypeTag::Boolean][..]));
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"a": ["string", "number"], "b": ["boolean"]})
        );
    }

    #[test]
    fn schema_of_no_rows_is_empty() {
        let schema: TableSchema = std::iter::empty().collect();
        assert!(schema.is_empty());
        assert_eq!(serde_json::to_value(&schema).unwrap(), json!({}));
    }

    #[test]
    fn truncate_keeps_total_count() {
        let rows: Vec<Entity> = (0..12_i64)
            .map(|i| entity(&[("n", EntityValue::from(i))]))
            .collect();

        let response = QueryResponse::truncate(rows, 5);

        assert_eq!(response.total_items, 12);
        assert_eq!(response.limit, 5);
        assert_eq!(response.items.len(), 5);
        assert_eq!(response.items[0]["n"], EntityValue::from(0_i64));
    }

    #[test]
    fn truncate_with_fewer_rows_than_limit() {
        let rows = vec![entity(&[("n", 1_i64.into())])];
        let response = QueryResponse::truncate(rows, 5);
        assert_eq!(response.total_items, 1);
        assert_eq!(response.items.len(), 1);
    }

    #[test]
    fn values_serialize_as_plain_json() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let row = entity(&[
            ("Name", "alice".into()),
            ("Age", 31_i64.into()),
            ("Active", true.into()),
            ("Joined", date.into()),
            ("Missing", EntityValue::Null),
        ]);

        let response = QueryResponse::truncate(vec![row], 5);

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "totalItems": 1,
                "limit": 5,
                "items": [{
                    "Active": true,
                    "Age": 31,
                    "Joined": "2024-03-01T12:30:00Z",
                    "Missing": null,
                    "Name": "alice"
                }]
            })
        );
    }
}
