use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, warn};

use crate::services::ServiceError;
use crate::store::StoreError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Service(err) => match err {
                ServiceError::MalformedInput(_) | ServiceError::ValidationFailed { .. } => {
                    StatusCode::BAD_REQUEST
                }
                ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
                ServiceError::DependencyConflict { .. }
                | ServiceError::ConcurrencyConflict { .. }
                | ServiceError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
                ServiceError::Store(StoreError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Service(err) => match err {
                ServiceError::MalformedInput(_) => "BAD_REQUEST",
                ServiceError::ValidationFailed { .. } => "VALIDATION_ERROR",
                ServiceError::NotFound { .. } => "NOT_FOUND",
                ServiceError::DependencyConflict { .. } => "DEPENDENCY_CONFLICT",
                ServiceError::ConcurrencyConflict { .. }
                | ServiceError::Store(StoreError::Conflict(_)) => "CONCURRENCY_CONFLICT",
                ServiceError::Store(StoreError::Database(_)) => "DATABASE_ERROR",
            },
        }
    }

    fn log(&self) {
        match self {
            AppError::Service(ServiceError::Store(StoreError::Database(e))) => {
                error!(error = ?e, "Database error");
            }
            AppError::Service(ServiceError::ConcurrencyConflict { entity, key }) => {
                error!(entity, key, "Unresolved concurrent modification");
            }
            other => {
                warn!(error = %other, code = other.code(), "Request rejected");
            }
        }
    }

    /// Message safe to show to API clients.
    fn public_message(&self) -> String {
        match self {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Service(ServiceError::ValidationFailed { .. }) => {
                "One or more fields are invalid".to_string()
            }
            AppError::Service(ServiceError::Store(StoreError::Database(_))) => {
                "A database error occurred".to_string()
            }
            AppError::Service(ServiceError::Store(StoreError::Conflict(_))) => {
                "The record was changed by another request".to_string()
            }
            AppError::Service(err) => err.to_string(),
        }
    }

    /// Field-level detail for errors the caller can act on.
    fn details(&self) -> Option<Value> {
        match self {
            AppError::Service(ServiceError::ValidationFailed { errors, candidate }) => Some(json!({
                "fields": errors,
                "candidate": candidate,
            })),
            AppError::Service(ServiceError::DependencyConflict { message, .. }) => Some(json!({
                "fields": { "tickets": [message] },
            })),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        error_response(
            self.code(),
            self.public_message(),
            self.details(),
            self.status_code(),
        )
    }
}
