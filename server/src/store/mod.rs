//! Persistence gateway for employees, events and tickets.
//!
//! Keys are caller-assigned. Tickets reference employees and events by key
//! only; the reverse direction is answered by lookups
//! ([`Store::employee_has_tickets`], [`Store::event_has_tickets`]), never by
//! in-memory back-references.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Employee, Event, Ticket, TicketDetails};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A write was rejected at commit: duplicate key, missing referenced row,
    /// row still referenced, or the target row no longer exists.
    #[error("Write conflict: {0}")]
    Conflict(String),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Transactional access to the three tables.
///
/// Every write commits before returning. Implementations enforce primary-key
/// uniqueness and foreign-key restrict, reporting violations as
/// [`StoreError::Conflict`].
#[async_trait]
pub trait Store: Send + Sync {
    /// Creates the schema if it does not exist yet. Safe to call repeatedly.
    async fn ensure_schema(&self) -> StoreResult<()>;

    async fn list_employees(&self) -> StoreResult<Vec<Employee>>;
    async fn find_employee(&self, service_number: i32) -> StoreResult<Option<Employee>>;
    async fn employee_exists(&self, service_number: i32) -> StoreResult<bool>;
    async fn insert_employee(&self, employee: &Employee) -> StoreResult<()>;
    /// Replaces the row with the same key; `Conflict` if it is gone.
    async fn update_employee(&self, employee: &Employee) -> StoreResult<()>;
    /// Returns `false` when there was nothing to delete.
    async fn delete_employee(&self, service_number: i32) -> StoreResult<bool>;

    async fn list_events(&self) -> StoreResult<Vec<Event>>;
    async fn find_event(&self, id: i32) -> StoreResult<Option<Event>>;
    async fn event_exists(&self, id: i32) -> StoreResult<bool>;
    async fn insert_event(&self, event: &Event) -> StoreResult<()>;
    async fn update_event(&self, event: &Event) -> StoreResult<()>;
    async fn delete_event(&self, id: i32) -> StoreResult<bool>;

    async fn list_ticket_details(&self) -> StoreResult<Vec<TicketDetails>>;
    async fn find_ticket_details(&self, ticket_number: i32) -> StoreResult<Option<TicketDetails>>;
    async fn ticket_exists(&self, ticket_number: i32) -> StoreResult<bool>;
    async fn insert_ticket(&self, ticket: &Ticket) -> StoreResult<()>;
    async fn update_ticket(&self, ticket: &Ticket) -> StoreResult<()>;
    async fn delete_ticket(&self, ticket_number: i32) -> StoreResult<bool>;

    /// Whether any ticket was issued to this employee.
    async fn employee_has_tickets(&self, service_number: i32) -> StoreResult<bool>;
    /// Whether any ticket was issued for this event.
    async fn event_has_tickets(&self, event_id: i32) -> StoreResult<bool>;
}
