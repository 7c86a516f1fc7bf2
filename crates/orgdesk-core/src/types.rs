//! Row and identity types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Object key under which organization-defined fields live on a row
pub const DYNAMIC_FIELDS_KEY: &str = "dynamicFields";

/// Default identity field used by the admin API
pub const DEFAULT_ID_FIELD: &str = "_id";

/// Identity of a row, taken from its `id_field`
///
/// Numeric identities are normalized to their decimal string form so that
/// `1` and `"1"` address the same row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build an identity from a JSON value, if it is usable as one
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// An opaque record as returned by the remote collaborator
///
/// Rows are JSON objects. Accessor paths address one level of nesting
/// (`dynamicFields.customField`); deeper paths are resolved the same way.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Builder-style insert of a top-level field
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Identity of this row under `id_field`
    pub fn id(&self, id_field: &str) -> Option<RowId> {
        self.0.get(id_field).and_then(RowId::from_value)
    }

    /// Resolve a dot-path accessor
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Set a value at a dot-path, merging into any existing nested object
    ///
    /// Intermediate objects are created when missing. A non-object value
    /// sitting on the path is replaced by an object.
    pub fn set_path(&mut self, path: &str, value: Value) {
        let segments: Vec<&str> = path.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut target = &mut self.0;
        for segment in parents {
            let entry = target
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            target = match entry.as_object_mut() {
                Some(map) => map,
                None => return,
            };
        }
        target.insert(last.to_string(), value);
    }

    /// Remove the value at a dot-path, leaving sibling fields untouched
    pub fn remove_path(&mut self, path: &str) -> Option<Value> {
        let segments: Vec<&str> = path.split('.').collect();
        let (last, parents) = segments.split_last()?;

        let mut target = &mut self.0;
        for segment in parents {
            target = target.get_mut(*segment)?.as_object_mut()?;
        }
        target.remove(*last)
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Row {
    type Error = CoreError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(CoreError::Other(format!(
                "expected a JSON object for a row, got {}",
                other
            ))),
        }
    }
}

impl From<Row> for Value {
    fn from(row: Row) -> Self {
        Value::Object(row.0)
    }
}
