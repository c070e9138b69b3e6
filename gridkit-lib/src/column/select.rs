//! Select cells

use serde_json::Value;

use super::CellContent;
use super::ColumnContext;
use super::EditInput;
use super::Editor;
use super::HighlightedText;
use crate::compile::SelectField;
use crate::error::ValidationError;
use crate::model::Row;
use crate::model::value_as_string;

pub(super) fn render(field: &SelectField, key: &str, row: &Row, ctx: &ColumnContext) -> CellContent {
    let Some(value) = row.get(key).and_then(value_as_string).filter(|v| !v.is_empty()) else {
        return CellContent::Empty;
    };
    // unmatched values show as stored
    let label = field
        .options
        .for_row(row)
        .into_iter()
        .find(|option| option.value == value)
        .map_or(value, |option| option.label);
    CellContent::Text(HighlightedText::highlight(&label, ctx.highlight.as_deref()))
}

/// Values compare in string form; an unmatched value selects nothing.
pub(super) fn editor(field: &SelectField, key: &str, row: &Row) -> Editor {
    let options = field.options.for_row(row);
    let current = row.get(key).and_then(value_as_string);
    let selected = current.filter(|value| options.iter().any(|o| &o.value == value));
    Editor::Choice {
        options,
        selected,
        clearable: true,
    }
}

pub(super) fn parse(
    field: &SelectField,
    key: &str,
    row: &Row,
    input: EditInput,
) -> Result<Value, ValidationError> {
    let value = match input {
        EditInput::Clear | EditInput::Value(Value::Null) => return Ok(Value::Null),
        EditInput::Text(text) => text,
        EditInput::Value(value) => value_as_string(&value)
            .ok_or_else(|| ValidationError::unknown_option(key, &value.to_string()))?,
    };
    if value.is_empty() {
        return Ok(Value::Null);
    }
    if field.options.for_row(row).iter().any(|o| o.value == value) {
        Ok(Value::String(value))
    } else {
        Err(ValidationError::unknown_option(key, &value))
    }
}
