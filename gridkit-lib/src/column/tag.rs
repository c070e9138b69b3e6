//! Tag cells

use serde_json::Value;

use super::CellContent;
use super::ColumnContext;
use super::EditInput;
use super::Editor;
use super::fk::raw_id;
use crate::compile::TagField;
use crate::error::ValidationError;
use crate::model::Row;
use crate::model::value_as_string;

/// Tags stored on the row; items may be strings or `{name: ..}` objects.
pub fn tags_of(row: &Row, key: &str) -> Vec<String> {
    let Some(Value::Array(items)) = row.get(key) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(object) => object.get("name").and_then(value_as_string),
            other => value_as_string(other),
        })
        .filter(|tag| !tag.trim().is_empty())
        .collect()
}

/// The scope a row's tag suggestions are loaded for.
pub(super) fn scope_id(row: &Row, ctx: &ColumnContext) -> Option<String> {
    let ownership = ctx.ownership_field.as_deref()?;
    row.get(ownership).and_then(raw_id)
}

pub(super) fn render(key: &str, row: &Row) -> CellContent {
    let tags = tags_of(row, key);
    if tags.is_empty() {
        CellContent::Empty
    } else {
        CellContent::Tags(tags)
    }
}

/// Static suggestions first, then whatever the suggestion cache holds for
/// the row's scope.
pub(super) fn editor(field: &TagField, key: &str, row: &Row, ctx: &ColumnContext) -> Editor {
    let mut suggestions = field.suggestions.clone();
    if let (Some(scope), Some(model)) = (scope_id(row, ctx), field.model_name.as_deref())
        && let Some(cached) = ctx.tag_cache.peek(&scope, model)
    {
        for tag in cached {
            if !suggestions.iter().any(|s| s.eq_ignore_ascii_case(&tag)) {
                suggestions.push(tag);
            }
        }
    }
    Editor::Tags {
        value: tags_of(row, key),
        suggestions,
    }
}

/// Accepts a list or comma-separated text; blanks and duplicates are dropped.
pub(super) fn parse(input: EditInput) -> Result<Value, ValidationError> {
    let raw: Vec<String> = match input {
        EditInput::Clear | EditInput::Value(Value::Null) => Vec::new(),
        EditInput::Text(text) => text.split(',').map(str::to_string).collect(),
        EditInput::Value(Value::Array(items)) => items.iter().filter_map(value_as_string).collect(),
        EditInput::Value(other) => value_as_string(&other)
            .map(|text| text.split(',').map(str::to_string).collect())
            .unwrap_or_default(),
    };

    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let tag = tag.trim();
        if !tag.is_empty() && !tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            tags.push(tag.to_string());
        }
    }
    Ok(Value::Array(tags.into_iter().map(Value::String).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tags_of_mixed_items() {
        let row = Row::new().set("labels", json!(["hot", {"name": "wet"}, "", {"id": 3}]));
        assert_eq!(tags_of(&row, "labels"), ["hot", "wet"]);
        assert!(tags_of(&Row::new(), "labels").is_empty());
    }

    #[test]
    fn test_parse_dedupes() {
        let parsed = parse(EditInput::Text("hot, wet,HOT, ,dry".into())).unwrap();
        assert_eq!(parsed, json!(["hot", "wet", "dry"]));
        assert_eq!(parse(EditInput::Clear).unwrap(), json!([]));
    }
}
