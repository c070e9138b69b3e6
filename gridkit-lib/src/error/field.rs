//! FieldError for Row accessors

use serde_json::Value;

/// Error type for typed field access on a [`Row`](crate::model::Row).
#[derive(Debug, Clone, thiserror::Error)]
pub enum FieldError {
    /// The requested field does not exist in the row.
    #[error("Field '{field}' not found in row")]
    Missing { field: String },

    /// The field exists but holds a different JSON type than requested.
    #[error("Field '{field}' type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A row was built from a JSON value that is not an object.
    #[error("Row must be a JSON object, got {actual}")]
    NotAnObject { actual: &'static str },
}

impl FieldError {
    /// Creates a new missing field error.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing {
            field: field.into(),
        }
    }

    /// Creates a new type mismatch error for the given JSON value.
    pub fn mismatch(field: impl Into<String>, expected: &'static str, actual: &Value) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            actual: json_type_name(actual),
        }
    }
}

/// Returns the JSON type name of a value.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
