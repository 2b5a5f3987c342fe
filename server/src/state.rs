use std::sync::Arc;

use crate::services::{Clock, EmployeeService, EventService, TicketService};
use crate::store::Store;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone: each service holds `Arc`s to the store and clock.
#[derive(Clone)]
pub struct AppState {
    pub employees: EmployeeService,
    pub events: EventService,
    pub tickets: TicketService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self {
            employees: EmployeeService::new(store.clone()),
            events: EventService::new(store.clone(), clock.clone()),
            tickets: TicketService::new(store, clock),
        }
    }
}
