//! Request body shapes per field type

use serde_json::Map;
use serde_json::Value;

use crate::compile::FieldConfig;
use crate::compile::FieldKind;

/// How a field's value is put into a PATCH body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadShape {
    /// `{key: value}`
    Plain(String),
    /// `{key: "HH:MM:SS"}`
    Time(String),
    /// `{"<key>_names": [..]}`; read from `key`, written under another name.
    Tags(String),
}

impl PayloadShape {
    pub fn for_field(config: &FieldConfig) -> Self {
        match config.kind {
            FieldKind::Time => Self::Time(config.key.clone()),
            FieldKind::Tag(_) => Self::Tags(config.key.clone()),
            _ => Self::Plain(config.key.clone()),
        }
    }

    /// The field key the value is read from.
    pub fn key(&self) -> &str {
        match self {
            Self::Plain(key) | Self::Time(key) | Self::Tags(key) => key,
        }
    }

    /// Builds the request body for `value`.
    pub fn payload(&self, value: &Value) -> Map<String, Value> {
        let mut body = Map::new();
        match self {
            Self::Plain(key) => {
                body.insert(key.clone(), value.clone());
            }
            Self::Time(key) => {
                let value = match value {
                    Value::String(time) => Value::String(with_seconds(time)),
                    other => other.clone(),
                };
                body.insert(key.clone(), value);
            }
            Self::Tags(key) => {
                body.insert(format!("{key}_names"), value.clone());
            }
        }
        body
    }
}

/// `"08:30"` -> `"08:30:00"`; full times and empty strings pass through.
fn with_seconds(time: &str) -> String {
    match time.matches(':').count() {
        1 => format!("{time}:00"),
        _ => time.to_string(),
    }
}
