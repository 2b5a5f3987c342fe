use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Store, StoreError, StoreResult};
use crate::models::{Employee, Event, Ticket, TicketDetails};

#[derive(Default)]
struct Tables {
    employees: BTreeMap<i32, Employee>,
    events: BTreeMap<i32, Event>,
    tickets: BTreeMap<i32, Ticket>,
    tickets_by_employee: HashMap<i32, BTreeSet<i32>>,
    tickets_by_event: HashMap<i32, BTreeSet<i32>>,
}

impl Tables {
    fn index_ticket(&mut self, ticket: &Ticket) {
        self.tickets_by_employee
            .entry(ticket.service_number)
            .or_default()
            .insert(ticket.ticket_number);
        self.tickets_by_event
            .entry(ticket.event_id)
            .or_default()
            .insert(ticket.ticket_number);
    }

    fn unindex_ticket(&mut self, ticket: &Ticket) {
        remove_from_index(&mut self.tickets_by_employee, ticket.service_number, ticket.ticket_number);
        remove_from_index(&mut self.tickets_by_event, ticket.event_id, ticket.ticket_number);
    }

    fn check_references(&self, ticket: &Ticket) -> StoreResult<()> {
        if !self.employees.contains_key(&ticket.service_number) {
            return Err(StoreError::Conflict(format!(
                "employee {} referenced by ticket {} does not exist",
                ticket.service_number, ticket.ticket_number
            )));
        }
        if !self.events.contains_key(&ticket.event_id) {
            return Err(StoreError::Conflict(format!(
                "event {} referenced by ticket {} does not exist",
                ticket.event_id, ticket.ticket_number
            )));
        }
        Ok(())
    }

    fn details(&self, ticket: &Ticket) -> Option<TicketDetails> {
        let employee = self.employees.get(&ticket.service_number)?;
        let event = self.events.get(&ticket.event_id)?;
        Some(TicketDetails {
            ticket: ticket.clone(),
            employee_full_name: employee.full_name(),
            event_name: event.name.clone(),
        })
    }
}

fn remove_from_index(index: &mut HashMap<i32, BTreeSet<i32>>, key: i32, ticket_number: i32) {
    if let Some(numbers) = index.get_mut(&key) {
        numbers.remove(&ticket_number);
        if numbers.is_empty() {
            index.remove(&key);
        }
    }
}

fn has_references(index: &HashMap<i32, BTreeSet<i32>>, key: i32) -> bool {
    index.get(&key).is_some_and(|numbers| !numbers.is_empty())
}

/// In-process store with the same constraint behavior as the SQL schema.
///
/// Rows are kept in key order, which is the order `list_*` returns them in.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ensure_schema(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        Ok(self.tables.read().await.employees.values().cloned().collect())
    }

    async fn find_employee(&self, service_number: i32) -> StoreResult<Option<Employee>> {
        Ok(self.tables.read().await.employees.get(&service_number).cloned())
    }

    async fn employee_exists(&self, service_number: i32) -> StoreResult<bool> {
        Ok(self.tables.read().await.employees.contains_key(&service_number))
    }

    async fn insert_employee(&self, employee: &Employee) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.employees.contains_key(&employee.service_number) {
            return Err(StoreError::Conflict(format!(
                "employee {} already exists",
                employee.service_number
            )));
        }
        tables
            .employees
            .insert(employee.service_number, employee.clone());
        Ok(())
    }

    async fn update_employee(&self, employee: &Employee) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        match tables.employees.get_mut(&employee.service_number) {
            Some(row) => {
                *row = employee.clone();
                Ok(())
            }
            None => Err(StoreError::Conflict(format!(
                "employee {} no longer exists",
                employee.service_number
            ))),
        }
    }

    async fn delete_employee(&self, service_number: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if has_references(&tables.tickets_by_employee, service_number) {
            return Err(StoreError::Conflict(format!(
                "employee {service_number} is still referenced by tickets"
            )));
        }
        Ok(tables.employees.remove(&service_number).is_some())
    }

    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        Ok(self.tables.read().await.events.values().cloned().collect())
    }

    async fn find_event(&self, id: i32) -> StoreResult<Option<Event>> {
        Ok(self.tables.read().await.events.get(&id).cloned())
    }

    async fn event_exists(&self, id: i32) -> StoreResult<bool> {
        Ok(self.tables.read().await.events.contains_key(&id))
    }

    async fn insert_event(&self, event: &Event) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.events.contains_key(&event.id) {
            return Err(StoreError::Conflict(format!(
                "event {} already exists",
                event.id
            )));
        }
        tables.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn update_event(&self, event: &Event) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        match tables.events.get_mut(&event.id) {
            Some(row) => {
                *row = event.clone();
                Ok(())
            }
            None => Err(StoreError::Conflict(format!(
                "event {} no longer exists",
                event.id
            ))),
        }
    }

    async fn delete_event(&self, id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if has_references(&tables.tickets_by_event, id) {
            return Err(StoreError::Conflict(format!(
                "event {id} is still referenced by tickets"
            )));
        }
        Ok(tables.events.remove(&id).is_some())
    }

    async fn list_ticket_details(&self) -> StoreResult<Vec<TicketDetails>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tickets
            .values()
            .filter_map(|ticket| tables.details(ticket))
            .collect())
    }

    async fn find_ticket_details(&self, ticket_number: i32) -> StoreResult<Option<TicketDetails>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tickets
            .get(&ticket_number)
            .and_then(|ticket| tables.details(ticket)))
    }

    async fn ticket_exists(&self, ticket_number: i32) -> StoreResult<bool> {
        Ok(self.tables.read().await.tickets.contains_key(&ticket_number))
    }

    async fn insert_ticket(&self, ticket: &Ticket) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.tickets.contains_key(&ticket.ticket_number) {
            return Err(StoreError::Conflict(format!(
                "ticket {} already exists",
                ticket.ticket_number
            )));
        }
        tables.check_references(ticket)?;
        tables.index_ticket(ticket);
        tables.tickets.insert(ticket.ticket_number, ticket.clone());
        Ok(())
    }

    async fn update_ticket(&self, ticket: &Ticket) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let Some(previous) = tables.tickets.get(&ticket.ticket_number).cloned() else {
            return Err(StoreError::Conflict(format!(
                "ticket {} no longer exists",
                ticket.ticket_number
            )));
        };
        tables.check_references(ticket)?;
        tables.unindex_ticket(&previous);
        tables.index_ticket(ticket);
        tables.tickets.insert(ticket.ticket_number, ticket.clone());
        Ok(())
    }

    async fn delete_ticket(&self, ticket_number: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.tickets.remove(&ticket_number) {
            Some(ticket) => {
                tables.unindex_ticket(&ticket);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn employee_has_tickets(&self, service_number: i32) -> StoreResult<bool> {
        Ok(has_references(
            &self.tables.read().await.tickets_by_employee,
            service_number,
        ))
    }

    async fn event_has_tickets(&self, event_id: i32) -> StoreResult<bool> {
        Ok(has_references(
            &self.tables.read().await.tickets_by_event,
            event_id,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    fn employee(service_number: i32) -> Employee {
        Employee {
            service_number,
            name: "Ann".into(),
            surname: "Lee".into(),
            post: "Clerk".into(),
            phone_number: "555-0100".into(),
        }
    }

    fn event(id: i32) -> Event {
        Event {
            id,
            name: "Expo".into(),
            event_date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            event_type: "Exhibition".into(),
        }
    }

    fn ticket(ticket_number: i32, service_number: i32, event_id: i32) -> Ticket {
        Ticket {
            ticket_number,
            service_number,
            event_id,
            sale_date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            ticket_type: "Adult".into(),
            payment_method: "Card".into(),
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_employee(&employee(1)).await.unwrap();
        store.insert_employee(&employee(2)).await.unwrap();
        store.insert_event(&event(10)).await.unwrap();
        store.insert_event(&event(20)).await.unwrap();
        store
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_conflict() {
        let store = seeded().await;
        let err = store.insert_employee(&employee(1)).await.unwrap_err();
        assert_matches!(err, StoreError::Conflict(_));
        assert_eq!(store.list_employees().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn ticket_with_missing_reference_is_rejected() {
        let store = seeded().await;
        let err = store.insert_ticket(&ticket(5, 99, 10)).await.unwrap_err();
        assert_matches!(err, StoreError::Conflict(_));
        assert!(!store.ticket_exists(5).await.unwrap());
        assert!(!store.employee_has_tickets(99).await.unwrap());
    }

    #[tokio::test]
    async fn reverse_lookups_follow_ticket_updates() {
        let store = seeded().await;
        store.insert_ticket(&ticket(5, 1, 10)).await.unwrap();
        assert!(store.employee_has_tickets(1).await.unwrap());
        assert!(store.event_has_tickets(10).await.unwrap());

        store.update_ticket(&ticket(5, 2, 20)).await.unwrap();
        assert!(!store.employee_has_tickets(1).await.unwrap());
        assert!(!store.event_has_tickets(10).await.unwrap());
        assert!(store.employee_has_tickets(2).await.unwrap());
        assert!(store.event_has_tickets(20).await.unwrap());

        assert!(store.delete_ticket(5).await.unwrap());
        assert!(!store.employee_has_tickets(2).await.unwrap());
        assert!(!store.delete_ticket(5).await.unwrap());
    }

    #[tokio::test]
    async fn referenced_rows_cannot_be_deleted() {
        let store = seeded().await;
        store.insert_ticket(&ticket(5, 1, 10)).await.unwrap();

        assert_matches!(store.delete_employee(1).await, Err(StoreError::Conflict(_)));
        assert_matches!(store.delete_event(10).await, Err(StoreError::Conflict(_)));
        assert!(store.employee_exists(1).await.unwrap());
        assert!(store.event_exists(10).await.unwrap());

        assert!(store.delete_employee(2).await.unwrap());
        assert!(!store.delete_employee(2).await.unwrap());
    }

    #[tokio::test]
    async fn update_of_missing_row_is_a_conflict() {
        let store = seeded().await;
        assert_matches!(
            store.update_employee(&employee(7)).await,
            Err(StoreError::Conflict(_))
        );
        assert_matches!(
            store.update_ticket(&ticket(7, 1, 10)).await,
            Err(StoreError::Conflict(_))
        );
    }

    #[tokio::test]
    async fn details_join_employee_and_event_names() {
        let store = seeded().await;
        store.insert_ticket(&ticket(5, 1, 10)).await.unwrap();

        let details = store.find_ticket_details(5).await.unwrap().unwrap();
        assert_eq!(details.employee_full_name, "Lee Ann");
        assert_eq!(details.event_name, "Expo");
        assert_eq!(store.list_ticket_details().await.unwrap(), vec![details]);
        assert!(store.find_ticket_details(6).await.unwrap().is_none());
    }
}
