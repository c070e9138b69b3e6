//! Text cells

use serde_json::Value;

use super::CellContent;
use super::ColumnContext;
use super::EditInput;
use super::Editor;
use super::HighlightedText;
use crate::compile::TextField;
use crate::error::ValidationError;
use crate::model::Row;
use crate::model::value_as_string;

pub(super) fn render(key: &str, row: &Row, ctx: &ColumnContext) -> CellContent {
    match row.get(key).and_then(value_as_string) {
        Some(text) if !text.is_empty() => {
            CellContent::Text(HighlightedText::highlight(&text, ctx.highlight.as_deref()))
        }
        _ => CellContent::Empty,
    }
}

pub(super) fn editor(field: &TextField, key: &str, row: &Row) -> Editor {
    Editor::Text {
        value: row.get_string(key).unwrap_or_default(),
        multiline: field.multiline,
    }
}

/// Text is saved as typed.
pub(super) fn parse(key: &str, input: EditInput) -> Result<Value, ValidationError> {
    match input {
        EditInput::Text(text) => Ok(Value::String(text)),
        EditInput::Value(Value::String(text)) => Ok(Value::String(text)),
        EditInput::Value(Value::Null) | EditInput::Clear => Ok(Value::String(String::new())),
        EditInput::Value(other) => value_as_string(&other)
            .map(Value::String)
            .ok_or_else(|| ValidationError::new(key, "invalid_text", "Expected text")),
    }
}
