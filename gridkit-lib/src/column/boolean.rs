//! Boolean cells

use serde_json::Value;

use super::BadgeTone;
use super::CellContent;
use super::EditInput;
use super::Editor;
use crate::compile::BooleanField;
use crate::error::ValidationError;
use crate::model::BooleanStyle;
use crate::model::Row;
use crate::model::SelectOption;

/// Reads a boolean leniently: `true`, `"true"`, `1`.
pub(super) fn current(key: &str, row: &Row) -> Option<bool> {
    match row.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}

pub(super) fn render(field: &BooleanField, key: &str, row: &Row) -> CellContent {
    let Some(value) = current(key, row) else {
        return CellContent::Empty;
    };
    let label = if value {
        field.true_label.clone()
    } else {
        field.false_label.clone()
    };
    match field.style {
        BooleanStyle::Badge => CellContent::Badge {
            label,
            tone: if value {
                BadgeTone::Positive
            } else {
                BadgeTone::Negative
            },
        },
        BooleanStyle::Icon => CellContent::Icon {
            checked: value,
            label,
        },
        BooleanStyle::Text => CellContent::text(label),
    }
}

/// The two-option dropdown.
pub(super) fn editor(field: &BooleanField, key: &str, row: &Row) -> Editor {
    Editor::Choice {
        options: vec![
            SelectOption::new("true", field.true_label.clone()),
            SelectOption::new("false", field.false_label.clone()),
        ],
        selected: current(key, row).map(|b| b.to_string()),
        clearable: false,
    }
}

/// The value a quick toggle saves: the negation of the current value.
pub(super) fn toggled(key: &str, row: &Row) -> Value {
    Value::Bool(!current(key, row).unwrap_or(false))
}

pub(super) fn parse(field: &BooleanField, key: &str, input: EditInput) -> Result<Value, ValidationError> {
    let text = match input {
        EditInput::Value(Value::Bool(b)) => return Ok(Value::Bool(b)),
        EditInput::Clear | EditInput::Value(Value::Null) => return Ok(Value::Null),
        EditInput::Text(text) | EditInput::Value(Value::String(text)) => text,
        EditInput::Value(other) => return Err(ValidationError::unknown_option(key, &other.to_string())),
    };

    let text = text.trim();
    if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case(&field.true_label) {
        Ok(Value::Bool(true))
    } else if text.eq_ignore_ascii_case("false") || text.eq_ignore_ascii_case(&field.false_label) {
        Ok(Value::Bool(false))
    } else {
        Err(ValidationError::unknown_option(key, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::BooleanInteraction;
    use serde_json::json;

    fn field(style: BooleanStyle) -> BooleanField {
        BooleanField {
            style,
            interaction: BooleanInteraction::Dropdown,
            true_label: "Active".into(),
            false_label: "Inactive".into(),
        }
    }

    #[test]
    fn test_styles() {
        let row = Row::new().set("on", true).set("off", "false");
        assert_eq!(
            render(&field(BooleanStyle::Badge), "on", &row),
            CellContent::Badge {
                label: "Active".into(),
                tone: BadgeTone::Positive
            }
        );
        assert_eq!(
            render(&field(BooleanStyle::Text), "off", &row),
            CellContent::text("Inactive")
        );
        assert_eq!(render(&field(BooleanStyle::Icon), "none", &row), CellContent::Empty);
    }

    #[test]
    fn test_parse_labels() {
        let field = field(BooleanStyle::Badge);
        assert_eq!(parse(&field, "on", EditInput::Text("inactive".into())).unwrap(), json!(false));
        assert_eq!(parse(&field, "on", EditInput::Value(json!("true"))).unwrap(), json!(true));
        assert!(parse(&field, "on", EditInput::Text("maybe".into())).is_err());
    }

    #[test]
    fn test_toggle_from_null() {
        let row = Row::new().set("on", Value::Null);
        assert_eq!(toggled("on", &row), json!(true));
    }
}
