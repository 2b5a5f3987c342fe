use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use super::{optional_key, route_key};
use crate::models::EventDraft;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::{created, empty_success, success};

const KEY_LABEL: &str = "Event ID";

#[derive(Serialize)]
struct EventFormOptions {
    event_types: &'static [&'static str],
}

pub async fn list_events(State(state): State<AppState>) -> AppResult<Response> {
    let events = state.events.list().await?;
    tracing::debug!(count = events.len(), "Listed events");
    Ok(success(events, "Events retrieved"))
}

pub async fn event_options(State(state): State<AppState>) -> Response {
    let options = EventFormOptions {
        event_types: state.events.event_types(),
    };
    success(options, "Event options retrieved")
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> AppResult<Response> {
    let event = state.events.get(optional_key(&raw)).await?;
    Ok(success(event, "Event retrieved"))
}

pub async fn create_event(
    State(state): State<AppState>,
    payload: Result<Json<EventDraft>, JsonRejection>,
) -> AppResult<Response> {
    let Json(draft) = payload?;
    let event = state.events.create(draft).await?;
    Ok(created(event, "Event created"))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    payload: Result<Json<EventDraft>, JsonRejection>,
) -> AppResult<Response> {
    let key = route_key(&raw, KEY_LABEL)?;
    let Json(draft) = payload?;
    let event = state.events.update(key, draft).await?;
    Ok(success(event, "Event updated"))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> AppResult<Response> {
    let key = route_key(&raw, KEY_LABEL)?;
    let message = if state.events.delete(key).await? {
        "Event deleted"
    } else {
        "Event already absent"
    };
    Ok(empty_success(message))
}
