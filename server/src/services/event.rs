use std::sync::Arc;

use chrono::NaiveDate;

use crate::models::{Event, EventDraft, Submitted, EVENT_TYPES};
use crate::store::{Store, StoreError};
use crate::utils::validation::{self, FieldErrors};

use super::{require_key, Clock, ServiceError, ServiceResult};

const ENTITY: &str = "Event";
const KEY_FIELD: &str = "id";
const KEY_LABEL: &str = "Event ID";

const MAX_NAME_CHARS: usize = 100;
const MAX_TYPE_CHARS: usize = 20;

fn check_fields(draft: &EventDraft, errors: &mut FieldErrors) {
    validation::required_text(errors, "name", "Name", draft.name.as_deref(), MAX_NAME_CHARS);
    validation::required_text(
        errors,
        "event_type",
        "Event type",
        draft.event_type.as_deref(),
        MAX_TYPE_CHARS,
    );
}

fn dependency_conflict(id: i32) -> ServiceError {
    ServiceError::DependencyConflict {
        entity: ENTITY,
        key: id,
        message: "Cannot delete an event that has tickets".to_string(),
    }
}

#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl EventService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Suggested event categories for input forms.
    pub fn event_types(&self) -> &'static [&'static str] {
        EVENT_TYPES
    }

    pub async fn list(&self) -> ServiceResult<Vec<Event>> {
        Ok(self.store.list_events().await?)
    }

    pub async fn get(&self, id: Option<i32>) -> ServiceResult<Event> {
        let key = require_key(id, KEY_LABEL)?;
        self.store
            .find_event(key)
            .await?
            .ok_or(ServiceError::NotFound { entity: ENTITY, key })
    }

    /// Fills in today's date when none was given and drops any time of day.
    /// An unparseable date is reported and left as submitted.
    fn normalize_date(
        &self,
        draft: &mut EventDraft,
        errors: &mut FieldErrors,
    ) -> Option<NaiveDate> {
        let date = validation::date_or(
            errors,
            "event_date",
            "Event date",
            draft.event_date.as_ref(),
            self.clock.today(),
        )?;
        draft.event_date = date.and_hms_opt(0, 0, 0).map(Submitted::Parsed);
        Some(date)
    }

    pub async fn create(&self, mut draft: EventDraft) -> ServiceResult<Event> {
        let mut errors = FieldErrors::new();
        let event_date = self.normalize_date(&mut draft, &mut errors);

        if let Some(key) =
            validation::positive_key(&mut errors, KEY_FIELD, KEY_LABEL, draft.id.as_ref())
        {
            if self.store.event_exists(key).await? {
                errors.add(KEY_FIELD, "An event with this ID already exists");
            }
        }
        if event_date.is_some_and(|date| date < self.clock.today()) {
            errors.add("event_date", "Event date cannot be in the past");
        }
        check_fields(&draft, &mut errors);

        let event = match draft.to_event() {
            Some(event) if errors.is_empty() => event,
            _ => return Err(ServiceError::validation(errors, &draft)),
        };

        match self.store.insert_event(&event).await {
            Ok(()) => {
                tracing::info!(id = event.id, event_date = %event.event_date, "Event created");
                Ok(event)
            }
            Err(StoreError::Conflict(reason)) => {
                tracing::warn!(id = event.id, %reason, "Event insert conflicted");
                Err(ServiceError::ConcurrencyConflict {
                    entity: ENTITY,
                    key: event.id,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Replaces an event in place. Past dates are accepted here so events
    /// that already took place stay editable.
    pub async fn update(&self, route_key: i32, mut draft: EventDraft) -> ServiceResult<Event> {
        if draft.key() != Some(route_key) {
            return Err(ServiceError::NotFound {
                entity: ENTITY,
                key: route_key,
            });
        }

        let mut errors = FieldErrors::new();
        self.normalize_date(&mut draft, &mut errors);
        validation::positive_key(&mut errors, KEY_FIELD, KEY_LABEL, draft.id.as_ref());
        check_fields(&draft, &mut errors);

        let event = match draft.to_event() {
            Some(event) if errors.is_empty() => event,
            _ => return Err(ServiceError::validation(errors, &draft)),
        };

        match self.store.update_event(&event).await {
            Ok(()) => {
                tracing::info!(id = route_key, "Event updated");
                Ok(event)
            }
            Err(StoreError::Conflict(reason)) => {
                if self.store.event_exists(route_key).await? {
                    tracing::error!(id = route_key, %reason, "Event update conflicted");
                    Err(ServiceError::ConcurrencyConflict {
                        entity: ENTITY,
                        key: route_key,
                    })
                } else {
                    Err(ServiceError::NotFound {
                        entity: ENTITY,
                        key: route_key,
                    })
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn delete(&self, id: i32) -> ServiceResult<bool> {
        if !self.store.event_exists(id).await? {
            tracing::debug!(id, "Event already absent");
            return Ok(false);
        }
        if self.store.event_has_tickets(id).await? {
            return Err(dependency_conflict(id));
        }

        match self.store.delete_event(id).await {
            Ok(deleted) => {
                tracing::info!(id, "Event deleted");
                Ok(deleted)
            }
            Err(StoreError::Conflict(_)) => Err(dependency_conflict(id)),
            Err(err) => Err(err.into()),
        }
    }
}
