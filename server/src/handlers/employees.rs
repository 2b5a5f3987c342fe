use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;

use super::{optional_key, route_key};
use crate::models::{EmployeeDraft, EmployeeView};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::{created, empty_success, success};

const KEY_LABEL: &str = "Service number";

pub async fn list_employees(State(state): State<AppState>) -> AppResult<Response> {
    let employees: Vec<EmployeeView> = state
        .employees
        .list()
        .await?
        .into_iter()
        .map(EmployeeView::from)
        .collect();
    tracing::debug!(count = employees.len(), "Listed employees");
    Ok(success(employees, "Employees retrieved"))
}

pub async fn get_employee(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> AppResult<Response> {
    let employee = state.employees.get(optional_key(&raw)).await?;
    Ok(success(EmployeeView::from(employee), "Employee retrieved"))
}

pub async fn create_employee(
    State(state): State<AppState>,
    payload: Result<Json<EmployeeDraft>, JsonRejection>,
) -> AppResult<Response> {
    let Json(draft) = payload?;
    let employee = state.employees.create(draft).await?;
    Ok(created(EmployeeView::from(employee), "Employee created"))
}

pub async fn update_employee(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    payload: Result<Json<EmployeeDraft>, JsonRejection>,
) -> AppResult<Response> {
    let key = route_key(&raw, KEY_LABEL)?;
    let Json(draft) = payload?;
    let employee = state.employees.update(key, draft).await?;
    Ok(success(EmployeeView::from(employee), "Employee updated"))
}

pub async fn delete_employee(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> AppResult<Response> {
    let key = route_key(&raw, KEY_LABEL)?;
    let message = if state.employees.delete(key).await? {
        "Employee deleted"
    } else {
        "Employee already absent"
    };
    Ok(empty_success(message))
}
