//! Foreign-key cells
//!
//! The display label of a foreign-key cell is resolved in this order:
//!
//! 1. the label template (`"{code}-{name}"`) applied to the cached option
//!    whose id matches the cell value
//! 2. the server-computed display field (`display_field`)
//! 3. the generic `<key>_label` field
//! 4. the label of the cached option with that id
//! 5. the raw id

use serde_json::Value;

use super::CellContent;
use super::ColumnContext;
use super::EditInput;
use super::Editor;
use super::HighlightedText;
use crate::cache::OptionList;
use crate::compile::ForeignKeyField;
use crate::error::ValidationError;
use crate::model::Row;
use crate::model::RowId;
use crate::model::ScopedOption;
use crate::model::SelectOption;

/// Characters treated as separators in label templates.
const SEPARATORS: &[char] = &['-', '_', '/', '|', ',', ':', '·'];

/// The option list a field reads from.
///
/// Scoped fields go through the scoped cache, except the ownership field
/// itself, which defines the scope and always uses the preloaded list.
pub(super) fn options_for(field: &ForeignKeyField, key: &str, ctx: &ColumnContext) -> Option<OptionList> {
    let is_ownership = ctx.ownership_field.as_deref() == Some(key);
    if field.scoped && !is_ownership {
        ctx.scoped_cache.peek(key)
    } else {
        ctx.fk_options.get(key).cloned()
    }
}

/// The id stored in a foreign-key cell; nested `{id, ..}` objects are accepted.
pub fn raw_id(value: &Value) -> Option<String> {
    let id = match value {
        Value::Object(object) => object.get("id").and_then(RowId::from_value),
        other => RowId::from_value(other),
    }?;
    let id = id.to_string();
    (!id.is_empty()).then_some(id)
}

/// Applies a label template to an option and cleans up the result.
///
/// # Example
///
/// ```
/// use gridkit_lib::column::apply_template;
/// use gridkit_lib::model::ScopedOption;
///
/// let press = ScopedOption::new("7", "Press").with_field("code", "A1").with_field("name", "Press");
/// assert_eq!(apply_template("{code}-{name}", &press), "A1-Press");
///
/// let unnamed = ScopedOption::new("8", "").with_field("code", "A2");
/// assert_eq!(apply_template("{code}-{name}", &unnamed), "A2");
/// ```
pub fn apply_template(template: &str, option: &ScopedOption) -> String {
    let mut resolved = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        resolved.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = after[..close].trim();
                resolved.push_str(&option.field(name).unwrap_or_default());
                rest = &after[close + 1..];
            }
            None => {
                resolved.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    resolved.push_str(rest);
    clean_separators(&resolved)
}

/// Collapses separator runs left by empty placeholders and strips them from
/// both ends: `"A1--Press"` -> `"A1-Press"`, `"-Press"` -> `"Press"`.
pub fn clean_separators(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = String::new();

    let flush = |run: &mut String, out: &mut String| {
        if run.is_empty() {
            return;
        }
        match run.chars().find(|c| SEPARATORS.contains(c)) {
            Some(separator) => {
                if run.starts_with(char::is_whitespace) {
                    out.push(' ');
                }
                out.push(separator);
                if run.ends_with(char::is_whitespace) {
                    out.push(' ');
                }
            }
            None => out.push(' '),
        }
        run.clear();
    };

    for c in text.chars() {
        if c.is_whitespace() || SEPARATORS.contains(&c) {
            run.push(c);
        } else {
            flush(&mut run, &mut out);
            out.push(c);
        }
    }
    flush(&mut run, &mut out);

    out.trim_matches(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
        .to_string()
}

/// Resolves the display label of the cell, `None` when the cell is empty.
pub fn resolve_label(
    field: &ForeignKeyField,
    key: &str,
    row: &Row,
    options: Option<&[ScopedOption]>,
) -> Option<String> {
    let id = row.get(key).and_then(raw_id)?;

    let option = options.and_then(|options| options.iter().find(|o| o.id == id));

    if let (Some(template), Some(option)) = (&field.label_template, option) {
        let label = apply_template(template, option);
        if !label.is_empty() {
            return Some(label);
        }
    }

    let server_label = |field_name: &str| row.get_string(field_name).filter(|l| !l.trim().is_empty());
    field
        .display_field
        .as_deref()
        .and_then(server_label)
        .or_else(|| server_label(&format!("{key}_label")))
        .or_else(|| option.map(|o| o.label.clone()))
        .or(Some(id))
}

pub(super) fn render(field: &ForeignKeyField, key: &str, row: &Row, ctx: &ColumnContext) -> CellContent {
    let options = options_for(field, key, ctx);
    match resolve_label(field, key, row, options.as_deref().map(Vec::as_slice)) {
        Some(label) => CellContent::Text(HighlightedText::highlight(&label, ctx.highlight.as_deref())),
        None => CellContent::Empty,
    }
}

pub(super) fn editor(field: &ForeignKeyField, key: &str, row: &Row, ctx: &ColumnContext) -> Editor {
    let options: Vec<SelectOption> = options_for(field, key, ctx)
        .map(|options| {
            options
                .iter()
                .map(|option| {
                    let label = field
                        .label_template
                        .as_deref()
                        .map(|template| apply_template(template, option))
                        .filter(|label| !label.is_empty())
                        .unwrap_or_else(|| option.label.clone());
                    SelectOption::new(option.id.clone(), label)
                })
                .collect()
        })
        .unwrap_or_default();

    let selected = row
        .get(key)
        .and_then(raw_id)
        .filter(|id| options.iter().any(|o| &o.value == id));

    Editor::Choice {
        options,
        selected,
        clearable: true,
    }
}

/// Cleared values save as `null`, anything else as the id string.
pub(super) fn parse(
    field: &ForeignKeyField,
    key: &str,
    input: EditInput,
    ctx: &ColumnContext,
) -> Result<Value, ValidationError> {
    let id = match input {
        EditInput::Clear | EditInput::Value(Value::Null) => return Ok(Value::Null),
        EditInput::Text(text) => Some(text.trim().to_string()).filter(|t| !t.is_empty()),
        EditInput::Value(value) => raw_id(&value),
    };
    let Some(id) = id else {
        return Ok(Value::Null);
    };

    // without a loaded list there is nothing to check against
    if let Some(options) = options_for(field, key, ctx)
        && !options.iter().any(|o| o.id == id)
    {
        return Err(ValidationError::unknown_option(key, &id));
    }
    Ok(Value::String(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(template: Option<&str>) -> ForeignKeyField {
        ForeignKeyField {
            endpoint: Some("/api/machines/".into()),
            label_template: template.map(Into::into),
            display_field: Some("machine_display".into()),
            scoped: false,
        }
    }

    fn press() -> ScopedOption {
        ScopedOption::from_value(&json!({"id": "7", "code": "A1", "name": "Press"})).unwrap()
    }

    #[test]
    fn test_template_resolution() {
        let row = Row::new().set("machine", "7");
        let options = [press()];
        let label = resolve_label(&field(Some("{code}-{name}")), "machine", &row, Some(&options[..]));
        assert_eq!(label.as_deref(), Some("A1-Press"));
    }

    #[test]
    fn test_separator_cleanup() {
        assert_eq!(clean_separators("A1--Press"), "A1-Press");
        assert_eq!(clean_separators("-A1-"), "A1");
        assert_eq!(clean_separators("A1 -  - Press"), "A1 - Press");
        assert_eq!(clean_separators("  "), "");

        let option = ScopedOption::from_value(&json!({"id": "7", "code": "A1", "name": "Press"})).unwrap();
        assert_eq!(apply_template("{code}-{missing}-{name}", &option), "A1-Press");
        assert_eq!(apply_template("{missing} | {name}", &option), "Press");
    }

    #[test]
    fn test_fallback_chain() {
        let template = field(Some("{code}"));
        let no_options = Row::new().set("machine", 7).set("machine_display", "Press (A1)");
        assert_eq!(
            resolve_label(&template, "machine", &no_options, None).as_deref(),
            Some("Press (A1)")
        );

        let generic = Row::new().set("machine", 7).set("machine_label", "Generic");
        assert_eq!(
            resolve_label(&template, "machine", &generic, Some(&[][..])).as_deref(),
            Some("Generic")
        );

        let bare = Row::new().set("machine", json!({"id": 9}));
        assert_eq!(resolve_label(&template, "machine", &bare, None).as_deref(), Some("9"));

        let empty = Row::new().set("machine", Value::Null);
        assert_eq!(resolve_label(&template, "machine", &empty, None), None);
    }

    #[test]
    fn test_empty_template_result_falls_back() {
        let option = ScopedOption::from_value(&json!({"id": "7"})).unwrap();
        let row = Row::new().set("machine", "7").set("machine_label", "Seven");
        let label = resolve_label(&field(Some("{code}")), "machine", &row, Some(&[option][..]));
        assert_eq!(label.as_deref(), Some("Seven"));
    }

    #[test]
    fn test_option_label_before_raw_id() {
        let plain = field(None);
        let option = ScopedOption::from_value(&json!({"id": "7", "label": "Press"})).unwrap();
        let options = [option];

        let bare = Row::new().set("machine", "7");
        assert_eq!(
            resolve_label(&plain, "machine", &bare, Some(&options[..])).as_deref(),
            Some("Press")
        );

        let labelled = Row::new().set("machine", "7").set("machine_label", "Server");
        assert_eq!(
            resolve_label(&plain, "machine", &labelled, Some(&options[..])).as_deref(),
            Some("Server")
        );

        let unknown = Row::new().set("machine", "8");
        assert_eq!(
            resolve_label(&plain, "machine", &unknown, Some(&options[..])).as_deref(),
            Some("8")
        );
    }
}
