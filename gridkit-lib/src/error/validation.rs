//! Validation error types

/// A client-side validation failure for one cell.
///
/// Validation errors block the save entirely; nothing is sent to the
/// backend. The message is shown inline beneath the cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// Human-readable validation error message.
    pub message: String,
    /// Machine-readable error code (e.g. `invalid_date`).
    pub code: &'static str,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(field: impl Into<String>, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code,
        }
    }

    pub fn invalid_date(field: impl Into<String>, input: &str) -> Self {
        Self::new(
            field,
            "invalid_date",
            format!("'{input}' is not a valid date (expected DD.MM.YYYY)"),
        )
    }

    pub fn invalid_time(field: impl Into<String>, input: &str) -> Self {
        Self::new(
            field,
            "invalid_time",
            format!("'{input}' is not a valid time (expected HH:MM)"),
        )
    }

    pub fn not_a_number(field: impl Into<String>, input: &str) -> Self {
        Self::new(field, "not_a_number", format!("'{input}' is not a number"))
    }

    pub fn below_min(field: impl Into<String>, min: f64) -> Self {
        Self::new(field, "below_min", format!("Value must be at least {min}"))
    }

    pub fn above_max(field: impl Into<String>, max: f64) -> Self {
        Self::new(field, "above_max", format!("Value must be at most {max}"))
    }

    pub fn step_mismatch(field: impl Into<String>, step: f64) -> Self {
        Self::new(
            field,
            "step_mismatch",
            format!("Value must be a multiple of {step}"),
        )
    }

    pub fn unknown_option(field: impl Into<String>, value: &str) -> Self {
        Self::new(
            field,
            "unknown_option",
            format!("'{value}' is not one of the available options"),
        )
    }

    pub fn read_only(field: impl Into<String>) -> Self {
        Self::new(field, "read_only", "This field cannot be edited here")
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.field, self.message, self.code)
    }
}

impl std::error::Error for ValidationError {}
