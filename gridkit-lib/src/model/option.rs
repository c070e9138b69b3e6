//! Reference-data option types

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use super::RowId;
use super::value_as_string;

/// Fields tried, in order, when an option object carries no explicit label.
const LABEL_FIELDS: [&str; 5] = ["label", "name", "display_name", "title", "code"];

/// A foreign-key option: an id, a label and whatever else the backend sent.
///
/// The extra fields feed label templates such as `"{code}-{name}"`.
///
/// # Example
///
/// ```
/// use gridkit_lib::model::ScopedOption;
/// use serde_json::json;
///
/// let option = ScopedOption::from_value(&json!({"id": 7, "code": "A1", "name": "Press"})).unwrap();
/// assert_eq!(option.id, "7");
/// assert_eq!(option.label, "Press");
/// assert_eq!(option.field("code").as_deref(), Some("A1"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedOption {
    /// The option id, in string form.
    pub id: String,
    /// The label shown in selectors.
    pub label: String,
    /// Every field of the source object.
    pub extra: Map<String, Value>,
}

impl ScopedOption {
    /// Creates an option with only an id and a label.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        let id = id.into();
        let label = label.into();
        let mut extra = Map::new();
        extra.insert("id".into(), Value::String(id.clone()));
        extra.insert("label".into(), Value::String(label.clone()));
        Self { id, label, extra }
    }

    /// Builds an option from a backend object; objects without an id are skipped.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let id = object.get("id").and_then(RowId::from_value)?;

        let label = LABEL_FIELDS
            .iter()
            .filter_map(|field| object.get(*field).and_then(value_as_string))
            .find(|label| !label.trim().is_empty())
            .unwrap_or_else(|| id.to_string());

        Some(Self {
            id: id.to_string(),
            label,
            extra: object.clone(),
        })
    }

    /// Adds an extra field (builder pattern).
    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(field.into(), value.into());
        self
    }

    /// Returns an extra field in string form; null and non-scalar values yield `None`.
    pub fn field(&self, name: &str) -> Option<String> {
        self.extra.get(name).and_then(value_as_string)
    }
}

impl Serialize for ScopedOption {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut object = self.extra.clone();
        object.insert("id".into(), Value::String(self.id.clone()));
        object.insert("label".into(), Value::String(self.label.clone()));
        object.serialize(serializer)
    }
}
