//! Generic record type
//!
//! The store treats business records as opaque field maps. A `Record` is such
//! a map plus the store-assigned id; it serializes flat, with `id` alongside
//! the other fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ids::RecordId;

/// Field name to value map carried by create/update calls
pub type Fields = Map<String, Value>;

/// Name of the id field in serialized records
pub const ID_FIELD: &str = "id";

/// A stored record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,

    #[serde(flatten)]
    pub fields: Fields,
}

impl Record {
    /// Create a record, dropping any `id` key from the field map
    pub fn new(id: RecordId, mut fields: Fields) -> Self {
        fields.remove(ID_FIELD);
        Self { id, fields }
    }

    /// Get a field value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Get a field as a string slice
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// Get a field as an unsigned integer
    pub fn get_u64(&self, field: &str) -> Option<u64> {
        self.fields.get(field).and_then(Value::as_u64)
    }

    /// Set a field value, returning the previous one
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Apply a partial update; `id` in the patch is ignored
    pub fn merge(&mut self, patch: &Fields) {
        for (key, value) in patch {
            if key != ID_FIELD {
                self.fields.insert(key.clone(), value.clone());
            }
        }
    }

    /// The record as a single JSON object, id included
    pub fn to_value(&self) -> Value {
        let mut object = self.fields.clone();
        object.insert(ID_FIELD.to_string(), Value::from(self.id.value()));
        Value::Object(object)
    }

    /// A display name for messages: `name`, else the resource-specific code, else the id
    pub fn label(&self) -> String {
        ["name", "batchNumber", "item_number"]
            .iter()
            .find_map(|field| self.get_str(field))
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", self.id))
    }
}

/// Build a field map from a JSON object literal; non-objects give an empty map
pub fn fields_from(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}

/// Read an explicit id out of a field map, if the caller supplied one
pub fn explicit_id(fields: &Fields) -> Option<RecordId> {
    fields.get(ID_FIELD).and_then(Value::as_u64).map(RecordId::new)
}
