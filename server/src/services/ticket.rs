use std::sync::Arc;

use crate::models::ticket::SelectOption;
use crate::models::{
    Submitted, Ticket, TicketDetails, TicketDraft, TicketFormOptions, PAYMENT_METHODS,
    TICKET_TYPES,
};
use crate::store::{Store, StoreError};
use crate::utils::validation::{self, FieldErrors};

use super::{require_key, Clock, ServiceError, ServiceResult};

const ENTITY: &str = "Ticket";
const KEY_FIELD: &str = "ticket_number";
const KEY_LABEL: &str = "Ticket number";

const MAX_CHOICE_CHARS: usize = 20;

#[derive(Clone)]
pub struct TicketService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl TicketService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn list(&self) -> ServiceResult<Vec<TicketDetails>> {
        Ok(self.store.list_ticket_details().await?)
    }

    pub async fn get(&self, ticket_number: Option<i32>) -> ServiceResult<TicketDetails> {
        let key = require_key(ticket_number, KEY_LABEL)?;
        self.store
            .find_ticket_details(key)
            .await?
            .ok_or(ServiceError::NotFound { entity: ENTITY, key })
    }

    /// Dropdown content for ticket forms.
    pub async fn form_options(&self) -> ServiceResult<TicketFormOptions> {
        let employees = self
            .store
            .list_employees()
            .await?
            .into_iter()
            .map(|employee| SelectOption {
                value: employee.service_number,
                label: employee.full_name(),
            })
            .collect();
        let events = self
            .store
            .list_events()
            .await?
            .into_iter()
            .map(|event| SelectOption {
                value: event.id,
                label: event.name,
            })
            .collect();

        Ok(TicketFormOptions {
            employees,
            events,
            ticket_types: TICKET_TYPES,
            payment_methods: PAYMENT_METHODS,
        })
    }

    /// Rules shared by create and edit: key positivity, sale date, text
    /// fields, and existence of the referenced employee and event.
    ///
    /// Lookups only run for keys that passed the positivity check.
    async fn check(&self, draft: &mut TicketDraft, errors: &mut FieldErrors) -> ServiceResult<()> {
        let today = self.clock.today();
        let sale_date =
            validation::date_or(errors, "sale_date", "Sale date", draft.sale_date.as_ref(), today);
        if let Some(sale_date) = sale_date {
            draft.sale_date = sale_date.and_hms_opt(0, 0, 0).map(Submitted::Parsed);
            if sale_date > today {
                errors.add("sale_date", "Sale date cannot be in the future");
            }
        }

        let service_number = validation::positive_key(
            errors,
            "service_number",
            "Service number",
            draft.service_number.as_ref(),
        );
        let event_id =
            validation::positive_key(errors, "event_id", "Event ID", draft.event_id.as_ref());

        if let Some(service_number) = service_number {
            if !self.store.employee_exists(service_number).await? {
                errors.add("service_number", "Employee not found");
            }
        }
        if let Some(event_id) = event_id {
            if !self.store.event_exists(event_id).await? {
                errors.add("event_id", "Event not found");
            }
        }

        validation::required_text(
            errors,
            "ticket_type",
            "Ticket type",
            draft.ticket_type.as_deref(),
            MAX_CHOICE_CHARS,
        );
        validation::required_text(
            errors,
            "payment_method",
            "Payment method",
            draft.payment_method.as_deref(),
            MAX_CHOICE_CHARS,
        );
        Ok(())
    }

    pub async fn create(&self, mut draft: TicketDraft) -> ServiceResult<Ticket> {
        let mut errors = FieldErrors::new();
        let key = draft.ticket_number.as_ref();
        if let Some(key) = validation::positive_key(&mut errors, KEY_FIELD, KEY_LABEL, key) {
            if self.store.ticket_exists(key).await? {
                errors.add(KEY_FIELD, "A ticket with this number already exists");
            }
        }
        self.check(&mut draft, &mut errors).await?;

        let ticket = match draft.to_ticket() {
            Some(ticket) if errors.is_empty() => ticket,
            _ => return Err(ServiceError::validation(errors, &draft)),
        };

        match self.store.insert_ticket(&ticket).await {
            Ok(()) => {
                tracing::info!(
                    ticket_number = ticket.ticket_number,
                    service_number = ticket.service_number,
                    event_id = ticket.event_id,
                    "Ticket created"
                );
                Ok(ticket)
            }
            Err(StoreError::Conflict(reason)) => {
                tracing::warn!(ticket_number = ticket.ticket_number, %reason, "Ticket insert conflicted");
                Err(ServiceError::ConcurrencyConflict {
                    entity: ENTITY,
                    key: ticket.ticket_number,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Replaces a ticket in place. The ticket number is immutable, so it is
    /// not re-checked for uniqueness.
    ///
    /// Unlike event edits, the date rule applies on edit as well as on create:
    /// a future sale date is rejected.
    pub async fn update(&self, route_key: i32, mut draft: TicketDraft) -> ServiceResult<Ticket> {
        if draft.key() != Some(route_key) {
            return Err(ServiceError::NotFound {
                entity: ENTITY,
                key: route_key,
            });
        }

        let mut errors = FieldErrors::new();
        let key = draft.ticket_number.as_ref();
        validation::positive_key(&mut errors, KEY_FIELD, KEY_LABEL, key);
        self.check(&mut draft, &mut errors).await?;

        let ticket = match draft.to_ticket() {
            Some(ticket) if errors.is_empty() => ticket,
            _ => return Err(ServiceError::validation(errors, &draft)),
        };

        match self.store.update_ticket(&ticket).await {
            Ok(()) => {
                tracing::info!(ticket_number = route_key, "Ticket updated");
                Ok(ticket)
            }
            Err(StoreError::Conflict(reason)) => {
                if self.store.ticket_exists(route_key).await? {
                    tracing::error!(ticket_number = route_key, %reason, "Ticket update conflicted");
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

    /// Tickets have no dependents, so deletion is unconditional.
    pub async fn delete(&self, ticket_number: i32) -> ServiceResult<bool> {
        let deleted = self.store.delete_ticket(ticket_number).await?;
        if deleted {
            tracing::info!(ticket_number, "Ticket deleted");
        }
        Ok(deleted)
    }
}
