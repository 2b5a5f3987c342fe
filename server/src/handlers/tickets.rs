use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;

use super::{optional_key, route_key};
use crate::models::TicketDraft;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::{created, empty_success, success};

const KEY_LABEL: &str = "Ticket number";

pub async fn list_tickets(State(state): State<AppState>) -> AppResult<Response> {
    let tickets = state.tickets.list().await?;
    tracing::debug!(count = tickets.len(), "Listed tickets");
    Ok(success(tickets, "Tickets retrieved"))
}

pub async fn ticket_options(State(state): State<AppState>) -> AppResult<Response> {
    let options = state.tickets.form_options().await?;
    Ok(success(options, "Ticket options retrieved"))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> AppResult<Response> {
    let ticket = state.tickets.get(optional_key(&raw)).await?;
    Ok(success(ticket, "Ticket retrieved"))
}

pub async fn create_ticket(
    State(state): State<AppState>,
    payload: Result<Json<TicketDraft>, JsonRejection>,
) -> AppResult<Response> {
    let Json(draft) = payload?;
    let ticket = state.tickets.create(draft).await?;
    Ok(created(ticket, "Ticket created"))
}

pub async fn update_ticket(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    payload: Result<Json<TicketDraft>, JsonRejection>,
) -> AppResult<Response> {
    let key = route_key(&raw, KEY_LABEL)?;
    let Json(draft) = payload?;
    let ticket = state.tickets.update(key, draft).await?;
    Ok(success(ticket, "Ticket updated"))
}

pub async fn delete_ticket(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> AppResult<Response> {
    let key = route_key(&raw, KEY_LABEL)?;
    let message = if state.tickets.delete(key).await? {
        "Ticket deleted"
    } else {
        "Ticket already absent"
    };
    Ok(empty_success(message))
}
