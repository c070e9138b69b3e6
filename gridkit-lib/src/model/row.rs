//! Dynamic row record

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::error::FieldError;
use crate::error::json_type_name;

/// Opaque row identifier.
///
/// Backends hand out numeric or string primary keys; the engine only ever
/// compares them, so both are normalized to their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    /// Creates a row id from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Reads a row id from a JSON string or number.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RowId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for RowId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

/// A row as delivered by the REST backend.
///
/// The engine never defines a row's shape; it only reads and writes named
/// fields. The primary key lives in the `id` field.
///
/// # Example
///
/// ```
/// use gridkit_lib::model::Row;
///
/// let row = Row::new()
///     .set("id", 7)
///     .set("name", "Press")
///     .set("active", true);
///
/// assert_eq!(row.id().unwrap().as_str(), "7");
/// assert_eq!(row.get_str("name").unwrap(), Some("Press"));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: Map<String, Value>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing JSON object.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Converts a JSON value into a row; anything but an object is rejected.
    pub fn from_value(value: Value) -> Result<Self, FieldError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(FieldError::NotAnObject {
                actual: json_type_name(&other),
            }),
        }
    }

    /// Returns the row id, if the row carries one.
    pub fn id(&self) -> Option<RowId> {
        self.fields.get("id").and_then(RowId::from_value)
    }

    // =========================================================================
    // Raw field access
    // =========================================================================

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the field value or `Value::Null` when absent.
    pub fn value(&self, field: &str) -> Value {
        self.fields.get(field).cloned().unwrap_or(Value::Null)
    }

    /// Returns `true` if the row contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns `true` if the row has no fields at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consumes the row and returns the underlying JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes a field and returns its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Overwrites this row's fields with every field of `other`.
    ///
    /// Fields only present here are kept.
    pub fn merge(&mut self, other: &Row) {
        for (key, value) in &other.fields {
            self.fields.insert(key.clone(), value.clone());
        }
    }

    // =========================================================================
    // Typed getters
    //
    // Return Err if field is missing or wrong type.
    // Return Ok(None) only if the field exists and is null.
    // =========================================================================

    /// Gets a string field value.
    pub fn get_str(&self, field: &str) -> Result<Option<&str>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(FieldError::mismatch(field, "string", other)),
        }
    }

    /// Gets a boolean field value.
    pub fn get_bool(&self, field: &str) -> Result<Option<bool>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(FieldError::mismatch(field, "bool", other)),
        }
    }

    /// Gets a numeric field value; numeric strings (decimal columns) are accepted.
    pub fn get_f64(&self, field: &str) -> Result<Option<f64>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(v @ Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| FieldError::mismatch(field, "number", v)),
            Some(other) => Err(FieldError::mismatch(field, "number", other)),
        }
    }

    /// Gets an array-of-strings field value.
    pub fn get_string_list(&self, field: &str) -> Result<Option<Vec<String>>, FieldError> {
        match self.fields.get(field) {
            None => Err(FieldError::missing(field)),
            Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => Ok(Some(
                items.iter().filter_map(value_as_string).collect(),
            )),
            Some(other) => Err(FieldError::mismatch(field, "array", other)),
        }
    }

    /// Gets a field's value rendered as a plain string (strings, numbers, bools).
    pub fn get_string(&self, field: &str) -> Option<String> {
        self.fields.get(field).and_then(value_as_string)
    }
}

impl From<Map<String, Value>> for Row {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Renders a scalar JSON value as a string; null, arrays and objects yield `None`.
pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_and_string_ids() {
        let numeric = Row::from_value(json!({"id": 12, "name": "Kiln"})).unwrap();
        let text = Row::from_value(json!({"id": "a-12"})).unwrap();

        assert_eq!(numeric.id(), Some(RowId::new("12")));
        assert_eq!(text.id(), Some(RowId::new("a-12")));
        assert_eq!(Row::new().id(), None);
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(matches!(
            Row::from_value(json!([1, 2])),
            Err(FieldError::NotAnObject { actual: "array" })
        ));
    }

    #[test]
    fn test_typed_getters() {
        let row = Row::new()
            .set("temp", "21.5")
            .set("count", 3)
            .set("tags", json!(["a", "b"]))
            .set("note", Value::Null);

        assert_eq!(row.get_f64("temp").unwrap(), Some(21.5));
        assert_eq!(row.get_f64("count").unwrap(), Some(3.0));
        assert_eq!(
            row.get_string_list("tags").unwrap(),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(row.get_str("note").unwrap(), None);
        assert!(matches!(row.get_str("missing"), Err(FieldError::Missing { .. })));
        assert!(matches!(
            row.get_bool("count"),
            Err(FieldError::TypeMismatch { expected: "bool", actual: "number", .. })
        ));
    }

    #[test]
    fn test_merge_overwrites_and_keeps() {
        let mut row = Row::new().set("id", 1).set("a", 1).set("b", 2);
        row.merge(&Row::new().set("b", 3).set("c", 4));

        assert_eq!(row.get("a"), Some(&json!(1)));
        assert_eq!(row.get("b"), Some(&json!(3)));
        assert_eq!(row.get("c"), Some(&json!(4)));
    }
}
