//! Date and time cells
//!
//! Dates are stored as ISO `YYYY-MM-DD` and shown in the configured
//! [`DateDisplay`] form. Times are stored as `HH:MM[:SS]`.

use chrono::Datelike;
use chrono::NaiveDate;
use serde_json::Value;

use super::CellContent;
use super::EditInput;
use super::Editor;
use crate::config::DateDisplay;
use crate::error::ValidationError;
use crate::model::Row;

// =============================================================================
// Dates
// =============================================================================

/// Parses a stored date. Datetime strings are cut to their date part.
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let date = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Parses user input: ISO, or day-month-year with `.`, `/` or `-`.
pub fn parse_date_input(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let parts: Vec<&str> = text.split(['.', '/', '-']).map(str::trim).collect();
    let [first, month, last] = parts.as_slice() else {
        return None;
    };
    // a four-digit first part means ISO order
    let (day, year) = if first.len() == 4 { (last, first) } else { (first, last) };

    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let year: i32 = match year.len() {
        4 => year.parse().ok()?,
        2 => 2000 + year.parse::<i32>().ok()?,
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn format_date(date: NaiveDate, display: DateDisplay) -> String {
    match display {
        DateDisplay::Iso => date.format("%Y-%m-%d").to_string(),
        DateDisplay::DayMonthYear { separator } => format!(
            "{:02}{separator}{:02}{separator}{:04}",
            date.day(),
            date.month(),
            date.year()
        ),
    }
}

pub(super) fn render_date(key: &str, row: &Row, display: DateDisplay) -> CellContent {
    let Some(raw) = row.get_string(key).filter(|s| !s.trim().is_empty()) else {
        return CellContent::Empty;
    };
    match parse_iso_date(&raw) {
        Some(date) => CellContent::text(format_date(date, display)),
        None => CellContent::text(raw),
    }
}

pub(super) fn date_editor(key: &str, row: &Row, display: DateDisplay) -> Editor {
    let iso = row.get_string(key).and_then(|raw| parse_iso_date(&raw));
    Editor::Date {
        value: iso.map(|d| format_date(d, display)).unwrap_or_default(),
        iso: iso.map(|d| d.format("%Y-%m-%d").to_string()),
    }
}

/// Free text and picker values both normalize to ISO. Invalid text blocks the save.
pub(super) fn parse_date(key: &str, input: EditInput) -> Result<Value, ValidationError> {
    let text = match input {
        EditInput::Clear | EditInput::Value(Value::Null) => return Ok(Value::Null),
        EditInput::Text(text) | EditInput::Value(Value::String(text)) => text,
        EditInput::Value(other) => return Err(ValidationError::invalid_date(key, &other.to_string())),
    };
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    parse_date_input(&text)
        .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
        .ok_or_else(|| ValidationError::invalid_date(key, text.trim()))
}

// =============================================================================
// Times
// =============================================================================

/// Parses `H:MM`, `HH:MM`, `HHMM` or `HH:MM:SS` into `HH:MM[:SS]`.
pub fn normalize_time(text: &str) -> Option<String> {
    let text = text.trim();
    let parts: Vec<&str> = text.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m] => (*h, *m, None),
        [h, m, s] => (*h, *m, Some(*s)),
        [compact] if compact.len() == 4 && compact.chars().all(|c| c.is_ascii_digit()) => {
            (&compact[..2], &compact[2..], None)
        }
        _ => return None,
    };

    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    match seconds {
        None => Some(format!("{hours:02}:{minutes:02}")),
        Some(seconds) => {
            if seconds.len() != 2 {
                return None;
            }
            let seconds: u32 = seconds.parse().ok()?;
            (seconds <= 59).then(|| format!("{hours:02}:{minutes:02}:{seconds:02}"))
        }
    }
}

/// `08:30:00` shows as `08:30`; times with seconds show in full.
pub(super) fn render_time(key: &str, row: &Row) -> CellContent {
    let Some(raw) = row.get_string(key).filter(|s| !s.trim().is_empty()) else {
        return CellContent::Empty;
    };
    match normalize_time(&raw) {
        Some(time) => CellContent::text(time.strip_suffix(":00").filter(|t| t.len() == 5).unwrap_or(&time)),
        None => CellContent::text(raw),
    }
}

pub(super) fn time_editor(key: &str, row: &Row) -> Editor {
    let value = row
        .get_string(key)
        .and_then(|raw| normalize_time(&raw))
        .map(|time| time.get(..5).unwrap_or(&time).to_string())
        .unwrap_or_default();
    Editor::Time { value }
}

pub(super) fn parse_time(key: &str, input: EditInput) -> Result<Value, ValidationError> {
    let text = match input {
        EditInput::Clear | EditInput::Value(Value::Null) => return Ok(Value::Null),
        EditInput::Text(text) | EditInput::Value(Value::String(text)) => text,
        EditInput::Value(other) => return Err(ValidationError::invalid_time(key, &other.to_string())),
    };
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    normalize_time(&text)
        .map(Value::String)
        .ok_or_else(|| ValidationError::invalid_time(key, text.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_date_input_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5);
        assert_eq!(parse_date_input("05.03.2024"), expected);
        assert_eq!(parse_date_input("5/3/2024"), expected);
        assert_eq!(parse_date_input("5-3-24"), expected);
        assert_eq!(parse_date_input("2024-03-05"), expected);
        assert_eq!(parse_date_input("31.02.2024"), None);
        assert_eq!(parse_date_input("yesterday"), None);
    }

    #[test]
    fn test_date_round_trip_through_display() {
        let row = Row::new().set("fired_on", "2024-03-05T10:00:00Z");
        let display = DateDisplay::default();
        assert_eq!(render_date("fired_on", &row, display), CellContent::text("05.03.2024"));
        assert_eq!(
            parse_date("fired_on", EditInput::Text("06.03.2024".into())).unwrap(),
            json!("2024-03-06")
        );
    }

    #[test]
    fn test_invalid_date_blocks() {
        let err = parse_date("fired_on", EditInput::Text("32.01.2024".into())).unwrap_err();
        assert_eq!(err.code, "invalid_date");
        assert_eq!(parse_date("fired_on", EditInput::Clear).unwrap(), Value::Null);
    }

    #[test]
    fn test_time_forms() {
        assert_eq!(normalize_time("8:30").as_deref(), Some("08:30"));
        assert_eq!(normalize_time("08:30").as_deref(), Some("08:30"));
        assert_eq!(normalize_time("0830").as_deref(), Some("08:30"));
        assert_eq!(normalize_time("08:30:15").as_deref(), Some("08:30:15"));
        assert_eq!(normalize_time("24:00"), None);
        assert_eq!(normalize_time("8:3"), None);
        assert_eq!(normalize_time("830"), None);
    }

    #[test]
    fn test_time_render_drops_zero_seconds() {
        let row = Row::new().set("a", "08:30:00").set("b", "08:30:15");
        assert_eq!(render_time("a", &row), CellContent::text("08:30"));
        assert_eq!(render_time("b", &row), CellContent::text("08:30:15"));
        assert_eq!(parse_time("a", EditInput::Text("7:05".into())).unwrap(), json!("07:05"));
        assert_eq!(parse_time("a", EditInput::Text("7".into())).unwrap_err().code, "invalid_time");
    }
}
