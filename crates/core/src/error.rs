//! Domain error taxonomy shared by the store and HTTP layers.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The id did not resolve to a stored entity.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Missing or malformed input.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The operation would break a uniqueness or dependency rule
    /// (duplicate email, department still referenced).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No session, or the session token is invalid.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the role does not allow the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<crate::validation::FieldError> for CoreError {
    fn from(err: crate::validation::FieldError) -> Self {
        Self::Validation(err.to_string())
    }
}
