//! Decoding of OData JSON entities returned by the table service.

use aztable_store::{Entity, EntityValue};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

const METADATA_PREFIX: &str = "odata.";
const TYPE_ANNOTATION_SUFFIX: &str = "@odata.type";

const EDM_DATE_TIME: &str = "Edm.DateTime";
const EDM_INT64: &str = "Edm.Int64";

/// Converts a raw OData entity into an [`Entity`].
///
/// Metadata and type annotation keys are dropped. `Edm.DateTime` and
/// `Edm.Int64` annotations are used to recover dates and 64-bit integers,
/// which the service transmits as strings.
#[must_use]
pub fn decode_entity(raw: &Map<String, Value>) -> Entity {
    let mut entity = Entity::new();
    for (name, value) in raw {
        if is_annotation(name) {
            continue;
        }
        let edm_type = raw
            .get(&format!("{name}{TYPE_ANNOTATION_SUFFIX}"))
            .and_then(Value::as_str);
        entity.insert(name.clone(), decode_value(value, edm_type));
    }
    entity
}

fn is_annotation(key: &str) -> bool {
    key.starts_with(METADATA_PREFIX) || key.ends_with(TYPE_ANNOTATION_SUFFIX)
}

fn decode_value(value: &Value, edm_type: Option<&str>) -> EntityValue {
    match (value, edm_type) {
        (Value::String(text), Some(EDM_DATE_TIME)) => DateTime::parse_from_rfc3339(text)
            .map_or_else(
                |_| EntityValue::String(text.clone()),
                |date| EntityValue::Date(date.with_timezone(&Utc)),
            ),
        (Value::String(text), Some(EDM_INT64)) => text
            .parse::<i64>()
            .map_or_else(|_| EntityValue::String(text.clone()), EntityValue::from),
        (Value::String(text), _) => EntityValue::String(text.clone()),
        (Value::Number(number), _) => EntityValue::Number(number.clone()),
        (Value::Bool(flag), _) => EntityValue::Boolean(*flag),
        (Value::Null, _) => EntityValue::Null,
        (nested @ (Value::Array(_) | Value::Object(_)), _) => EntityValue::String(nested.to_string()),
    }
}
