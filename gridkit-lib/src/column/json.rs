//! JSON cells (read-only)

use serde_json::Value;

use super::CellContent;
use crate::compile::JsonField;
use crate::model::Row;

pub(super) fn render(field: &JsonField, key: &str, row: &Row) -> CellContent {
    match row.get(key) {
        None | Some(Value::Null) => CellContent::Empty,
        Some(value) => CellContent::Json {
            pretty: serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
            copyable: field.copyable,
        },
    }
}
