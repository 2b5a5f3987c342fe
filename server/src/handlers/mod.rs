use axum::response::Response;
use serde::Serialize;

use crate::utils::error::AppError;
use crate::utils::response::success;

pub mod employees;
pub mod events;
pub mod tickets;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "registry-api",
        version: env!("CARGO_PKG_VERSION"),
    };

    success(payload, "Health check successful")
}

/// Route keys that are not integers read as absent.
fn optional_key(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

/// Route key for writes; anything but an integer is rejected outright.
fn route_key(raw: &str, label: &str) -> Result<i32, AppError> {
    optional_key(raw).ok_or_else(|| AppError::BadRequest(format!("{label} must be an integer")))
}
