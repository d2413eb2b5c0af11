//! Stored document model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Open field map carried by every document.
pub type Fields = Map<String, Value>;

/// Identifier field, always assigned by the store.
pub const ID_FIELD: &str = "id";

/// One stored record: a store-assigned `id` plus arbitrary fields.
///
/// Fields the crate does not know about are flattened next to `id` and pass
/// through every read and write untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,

    #[serde(flatten)]
    pub fields: Fields,
}

impl Document {
    /// Build a document, dropping any `id` smuggled in through `fields`.
    pub fn new(id: impl Into<String>, mut fields: Fields) -> Self {
        fields.remove(ID_FIELD);
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Look up a field; `id` resolves to the document id.
    pub fn get(&self, field: &str) -> Option<Value> {
        if field == ID_FIELD {
            return Some(Value::String(self.id.clone()));
        }
        self.fields.get(field).cloned()
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.fields.get(field).and_then(Value::as_bool)
    }

    /// Set a single field. Setting `id` is ignored.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        if field != ID_FIELD {
            self.fields.insert(field, value.into());
        }
    }

    /// Shallow-merge `partial` over the current fields; `id` never changes.
    pub fn merge(&mut self, partial: &Fields) {
        for (key, value) in partial {
            if key != ID_FIELD {
                self.fields.insert(key.clone(), value.clone());
            }
        }
    }

    /// Whether this document belongs to `owner` through its `userId` field.
    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.get_str(super::USER_ID_FIELD) == Some(owner)
    }
}

/// Convert a `json!({...})` literal into a field map.
///
/// Non-object values produce an empty map.
pub fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}
