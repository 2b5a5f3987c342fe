use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{Store, StoreError, StoreResult};
use crate::models::{Employee, Event, Ticket, TicketDetails};

/// Schema statements, each idempotent. Foreign keys restrict deletes; the
/// services refuse to delete referenced rows before storage is reached.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS employees (
        service_number INTEGER PRIMARY KEY CHECK (service_number > 0),
        name VARCHAR(50) NOT NULL,
        surname VARCHAR(50) NOT NULL,
        post VARCHAR(50) NOT NULL,
        phone_number VARCHAR(20) NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS events (
        id INTEGER PRIMARY KEY CHECK (id > 0),
        name VARCHAR(100) NOT NULL,
        event_date DATE NOT NULL DEFAULT CURRENT_DATE,
        event_type VARCHAR(20) NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS tickets (
        ticket_number INTEGER PRIMARY KEY CHECK (ticket_number > 0),
        service_number INTEGER NOT NULL REFERENCES employees (service_number),
        event_id INTEGER NOT NULL REFERENCES events (id),
        sale_date DATE NOT NULL DEFAULT CURRENT_DATE,
        ticket_type VARCHAR(20) NOT NULL,
        payment_method VARCHAR(20) NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS ix_tickets_service_number ON tickets (service_number)",
    "CREATE INDEX IF NOT EXISTS ix_tickets_event_id ON tickets (event_id)",
];

const EMPLOYEE_COLUMNS: &str = "service_number, name, surname, post, phone_number";
const EVENT_COLUMNS: &str = "id, name, event_date, event_type";

const TICKET_DETAILS_QUERY: &str = "SELECT t.ticket_number, t.service_number, t.event_id,
        t.sale_date, t.ticket_type, t.payment_method,
        e.surname || ' ' || e.name AS employee_full_name,
        ev.name AS event_name
     FROM tickets t
     JOIN employees e ON e.service_number = t.service_number
     JOIN events ev ON ev.id = t.event_id";

/// PostgreSQL unique_violation.
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL foreign_key_violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Create a connection pool from a database URL.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Constraint violations become conflicts; everything else stays a
/// database error.
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) | Some(FOREIGN_KEY_VIOLATION) => {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return StoreError::Conflict(format!("constraint {constraint} violated"));
            }
            _ => {}
        }
    }
    StoreError::Database(err)
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, query: &str, key: i32) -> StoreResult<bool> {
        let found: bool = sqlx::query_scalar(query)
            .bind(key)
            .fetch_one(&self.pool)
            .await?;
        Ok(found)
    }

    /// Runs one keyed DELETE in its own transaction.
    async fn delete_by_key(&self, query: &str, key: i32) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(query)
            .bind(key)
            .execute(&mut *tx)
            .await
            .map_err(classify)?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ensure_schema(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("Database schema ensured");
        Ok(())
    }

    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        let query = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY service_number");
        let rows = sqlx::query_as::<_, Employee>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_employee(&self, service_number: i32) -> StoreResult<Option<Employee>> {
        let query = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE service_number = $1");
        let row = sqlx::query_as::<_, Employee>(&query)
            .bind(service_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn employee_exists(&self, service_number: i32) -> StoreResult<bool> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM employees WHERE service_number = $1)",
            service_number,
        )
        .await
    }

    async fn insert_employee(&self, employee: &Employee) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO employees (service_number, name, surname, post, phone_number)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(employee.service_number)
        .bind(&employee.name)
        .bind(&employee.surname)
        .bind(&employee.post)
        .bind(&employee.phone_number)
        .execute(&mut *tx)
        .await
        .map_err(classify)?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_employee(&self, employee: &Employee) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE employees SET name = $2, surname = $3, post = $4, phone_number = $5
             WHERE service_number = $1",
        )
        .bind(employee.service_number)
        .bind(&employee.name)
        .bind(&employee.surname)
        .bind(&employee.post)
        .bind(&employee.phone_number)
        .execute(&mut *tx)
        .await
        .map_err(classify)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!(
                "employee {} no longer exists",
                employee.service_number
            )));
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_employee(&self, service_number: i32) -> StoreResult<bool> {
        self.delete_by_key("DELETE FROM employees WHERE service_number = $1", service_number)
            .await
    }

    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY id");
        let rows = sqlx::query_as::<_, Event>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_event(&self, id: i32) -> StoreResult<Option<Event>> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let row = sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn event_exists(&self, id: i32) -> StoreResult<bool> {
        self.exists("SELECT EXISTS (SELECT 1 FROM events WHERE id = $1)", id)
            .await
    }

    async fn insert_event(&self, event: &Event) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO events (id, name, event_date, event_type) VALUES ($1, $2, $3, $4)",
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(event.event_date)
        .bind(&event.event_type)
        .execute(&mut *tx)
        .await
        .map_err(classify)?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_event(&self, event: &Event) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE events SET name = $2, event_date = $3, event_type = $4 WHERE id = $1",
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(event.event_date)
        .bind(&event.event_type)
        .execute(&mut *tx)
        .await
        .map_err(classify)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!(
                "event {} no longer exists",
                event.id
            )));
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_event(&self, id: i32) -> StoreResult<bool> {
        self.delete_by_key("DELETE FROM events WHERE id = $1", id)
            .await
    }

    async fn list_ticket_details(&self) -> StoreResult<Vec<TicketDetails>> {
        let query = format!("{TICKET_DETAILS_QUERY} ORDER BY t.ticket_number");
        let rows = sqlx::query_as::<_, TicketDetails>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_ticket_details(&self, ticket_number: i32) -> StoreResult<Option<TicketDetails>> {
        let query = format!("{TICKET_DETAILS_QUERY} WHERE t.ticket_number = $1");
        let row = sqlx::query_as::<_, TicketDetails>(&query)
            .bind(ticket_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn ticket_exists(&self, ticket_number: i32) -> StoreResult<bool> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM tickets WHERE ticket_number = $1)",
            ticket_number,
        )
        .await
    }

    async fn insert_ticket(&self, ticket: &Ticket) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO tickets
                (ticket_number, service_number, event_id, sale_date, ticket_type, payment_method)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(ticket.ticket_number)
        .bind(ticket.service_number)
        .bind(ticket.event_id)
        .bind(ticket.sale_date)
        .bind(&ticket.ticket_type)
        .bind(&ticket.payment_method)
        .execute(&mut *tx)
        .await
        .map_err(classify)?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_ticket(&self, ticket: &Ticket) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE tickets SET service_number = $2, event_id = $3, sale_date = $4,
                ticket_type = $5, payment_method = $6
             WHERE ticket_number = $1",
        )
        .bind(ticket.ticket_number)
        .bind(ticket.service_number)
        .bind(ticket.event_id)
        .bind(ticket.sale_date)
        .bind(&ticket.ticket_type)
        .bind(&ticket.payment_method)
        .execute(&mut *tx)
        .await
        .map_err(classify)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!(
                "ticket {} no longer exists",
                ticket.ticket_number
            )));
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_ticket(&self, ticket_number: i32) -> StoreResult<bool> {
        self.delete_by_key("DELETE FROM tickets WHERE ticket_number = $1", ticket_number)
            .await
    }

    async fn employee_has_tickets(&self, service_number: i32) -> StoreResult<bool> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM tickets WHERE service_number = $1)",
            service_number,
        )
        .await
    }

    async fn event_has_tickets(&self, event_id: i32) -> StoreResult<bool> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM tickets WHERE event_id = $1)",
            event_id,
        )
        .await
    }
}
