//! Error types

mod api;
mod field;
mod mutation;
mod validation;

pub use api::*;
pub use field::*;
pub use mutation::*;
pub use validation::*;

/// Umbrella error for every fallible engine operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The REST backend rejected or failed a request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Client-side validation blocked a save.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A create, update or delete was rejected by the server.
    #[error(transparent)]
    Mutation(#[from] MutationError),

    /// A typed row accessor failed.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// JSON (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The local preset database failed.
    #[error("Storage error: {0}")]
    Storage(#[from] async_sqlite::Error),

    /// The field key is not part of the table's field matrix.
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    /// No row with this id is loaded on the current page.
    #[error("Unknown row '{0}'")]
    UnknownRow(String),

    /// The operation is not valid in the current state.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl Error {
    /// Returns the validation error, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the HTTP status code if the backend answered with an error status.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(e) => e.status_code(),
            _ => None,
        }
    }
}
