//! Mutation error reported to the caller's error reporter

use serde_json::Value;

use super::Error;
use crate::model::RowId;

/// The kind of write that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// A server-rejected create, update or delete.
///
/// Carries everything an error reporter needs: which record, what kind of
/// write, a readable message and the raw technical payload.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{operation} of record {} failed: {message}", .record_id.as_ref().map_or("<new>", |id| id.as_str()))]
pub struct MutationError {
    /// The record the write targeted (`None` for creates).
    pub record_id: Option<RowId>,
    /// The kind of write.
    pub operation: MutationKind,
    /// The edited field, for single-field updates.
    pub field: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// Raw response payload or transport error text.
    pub technical: Option<Value>,
}

impl MutationError {
    /// Builds a mutation error from the error a backend call returned.
    pub fn from_error(
        record_id: Option<RowId>,
        operation: MutationKind,
        field: Option<&str>,
        error: &Error,
    ) -> Self {
        let (message, technical) = match error {
            Error::Api(api) => (
                api.message(),
                api.body()
                    .cloned()
                    .or_else(|| Some(Value::String(api.to_string()))),
            ),
            other => (other.to_string(), None),
        };

        Self {
            record_id,
            operation,
            field: field.map(str::to_string),
            message,
            technical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn test_from_http_error_keeps_payload() {
        let err = Error::Api(ApiError::from_body(400, r#"{"detail": "locked"}"#));
        let mutation =
            MutationError::from_error(Some(RowId::new("9")), MutationKind::Update, Some("name"), &err);

        assert_eq!(mutation.message, "locked");
        assert_eq!(mutation.field.as_deref(), Some("name"));
        assert_eq!(
            mutation.technical,
            Some(serde_json::json!({"detail": "locked"}))
        );
        assert_eq!(mutation.to_string(), "update of record 9 failed: locked");
    }

    #[test]
    fn test_create_has_no_record() {
        let err = Error::InvalidOperation("nope".into());
        let mutation = MutationError::from_error(None, MutationKind::Create, None, &err);
        assert_eq!(mutation.to_string(), "create of record <new> failed: Invalid operation: nope");
        assert!(mutation.technical.is_none());
    }
}
