//! API error types

use std::time::Duration;

use serde_json::Value;

/// Errors that can occur while talking to the REST backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Human-readable message extracted from the body.
        message: String,
        /// Raw response body, parsed as JSON when possible.
        body: Option<Value>,
    },

    /// Network error during the call.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse the response.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },
}

impl ApiError {
    /// Creates a new HTTP error without a body.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: None,
        }
    }

    /// Builds an HTTP error from a raw response body.
    ///
    /// REST backends report errors as `{"detail": "..."}`, as
    /// `{"non_field_errors": [...]}` or as a map of field name to messages.
    /// The first readable message wins; the parsed body is kept as the
    /// technical payload.
    pub fn from_body(status: u16, text: &str) -> Self {
        let body = serde_json::from_str::<Value>(text).ok();
        let message = body
            .as_ref()
            .and_then(extract_message)
            .unwrap_or_else(|| {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    format!("request failed with status {status}")
                } else {
                    trimmed.to_string()
                }
            });

        Self::Http {
            status,
            message,
            body: body.or_else(|| (!text.is_empty()).then(|| Value::String(text.to_string()))),
        }
    }

    /// Creates a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: None,
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw error payload, if the server sent one.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Returns the short message without the status prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Http { message, .. } | Self::Parse { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

fn extract_message(body: &Value) -> Option<String> {
    match body {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => items.iter().find_map(extract_message),
        Value::Object(map) => {
            for key in ["detail", "message", "error", "non_field_errors"] {
                if let Some(msg) = map.get(key).and_then(extract_message) {
                    return Some(msg);
                }
            }
            map.iter().find_map(|(field, value)| {
                extract_message(value).map(|msg| format!("{field}: {msg}"))
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_message() {
        let err = ApiError::from_body(403, r#"{"detail": "CSRF Failed"}"#);
        assert_eq!(err.status_code(), Some(403));
        assert_eq!(err.message(), "CSRF Failed");
        assert!(err.body().is_some());
    }

    #[test]
    fn test_field_message() {
        let err = ApiError::from_body(400, r#"{"temperature": ["Ensure this value is less than or equal to 1500."]}"#);
        assert_eq!(
            err.message(),
            "temperature: Ensure this value is less than or equal to 1500."
        );
    }

    #[test]
    fn test_plain_text_body() {
        let err = ApiError::from_body(502, "Bad Gateway");
        assert_eq!(err.message(), "Bad Gateway");
        assert_eq!(err.body(), Some(&Value::String("Bad Gateway".into())));
    }

    #[test]
    fn test_empty_body() {
        let err = ApiError::from_body(500, "");
        assert_eq!(err.message(), "request failed with status 500");
        assert!(err.body().is_none());
    }
}
