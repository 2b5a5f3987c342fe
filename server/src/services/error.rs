use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::store::StoreError;
use crate::utils::validation::FieldErrors;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing or non-positive key; storage was not consulted.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// One or more field rules failed. `candidate` is the submitted record,
    /// returned so the caller can re-display it.
    #[error("Validation failed: {errors}")]
    ValidationFailed { errors: FieldErrors, candidate: Value },

    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: i32 },

    /// Delete refused because tickets still reference the row.
    #[error("{message}")]
    DependencyConflict {
        entity: &'static str,
        key: i32,
        message: String,
    },

    /// The row changed under a write and still exists. Not retried.
    #[error("{entity} {key} was modified concurrently")]
    ConcurrencyConflict { entity: &'static str, key: i32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn validation<T: Serialize>(errors: FieldErrors, candidate: &T) -> Self {
        ServiceError::ValidationFailed {
            errors,
            candidate: serde_json::to_value(candidate).unwrap_or_default(),
        }
    }

    /// The field-level errors, if this is a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ServiceError::ValidationFailed { errors, .. } => Some(errors),
            _ => None,
        }
    }
}
