//! Number and temperature cells

use serde_json::Value;

use super::CellContent;
use super::EditInput;
use super::Editor;
use crate::compile::NumberField;
use crate::error::ValidationError;
use crate::model::Row;

/// `decimals`-place fixed formatting plus the unit, if any.
pub fn format_number(field: &NumberField, value: f64) -> String {
    let number = format!("{:.*}", field.decimals as usize, value);
    match &field.unit {
        Some(unit) => format!("{number} {unit}"),
        None => number,
    }
}

pub(super) fn render(field: &NumberField, key: &str, row: &Row) -> CellContent {
    match row.get_f64(key) {
        Ok(Some(value)) => CellContent::text(format_number(field, value)),
        Ok(None) => CellContent::Empty,
        // not numeric; show what the backend sent
        Err(_) => row
            .get_string(key)
            .filter(|text| !text.trim().is_empty())
            .map_or(CellContent::Empty, CellContent::text),
    }
}

pub(super) fn editor(field: &NumberField, key: &str, row: &Row) -> Editor {
    Editor::Number {
        value: row
            .get_f64(key)
            .ok()
            .flatten()
            .map(|v| v.to_string())
            .unwrap_or_default(),
        min: field.min,
        max: field.max,
        step: field.step,
        unit: field.unit.clone(),
    }
}

pub(super) fn parse(field: &NumberField, key: &str, input: EditInput) -> Result<Value, ValidationError> {
    let value = match input {
        EditInput::Clear | EditInput::Value(Value::Null) => return Ok(Value::Null),
        EditInput::Value(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| ValidationError::not_a_number(key, &n.to_string()))?,
        EditInput::Text(text) | EditInput::Value(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(Value::Null);
            }
            trimmed
                .replace(',', ".")
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ValidationError::not_a_number(key, trimmed))?
        }
        EditInput::Value(other) => return Err(ValidationError::not_a_number(key, &other.to_string())),
    };

    validate(field, key, value)?;
    Ok(Value::from(value))
}

fn validate(field: &NumberField, key: &str, value: f64) -> Result<(), ValidationError> {
    if let Some(min) = field.min.filter(|min| value < *min) {
        return Err(ValidationError::below_min(key, min));
    }
    if let Some(max) = field.max.filter(|max| value > *max) {
        return Err(ValidationError::above_max(key, max));
    }
    if let Some(step) = field.step {
        let base = field.step_base.unwrap_or(0.0);
        let steps = (value - base) / step;
        if (steps - steps.round()).abs() > 1e-9 * steps.abs().max(1.0) {
            return Err(ValidationError::step_mismatch(key, step));
        }
    }
    Ok(())
}
