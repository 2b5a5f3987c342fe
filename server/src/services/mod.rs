//! Validation and CRUD façades, one per entity.

pub mod clock;
pub mod employee;
pub mod error;
pub mod event;
pub mod ticket;

pub use clock::{Clock, FixedClock, SystemClock};
pub use employee::EmployeeService;
pub use error::{ServiceError, ServiceResult};
pub use event::EventService;
pub use ticket::TicketService;

/// Maps a route or form key to a lookup key, rejecting absent and
/// non-positive values before storage is touched.
pub(crate) fn require_key(key: Option<i32>, label: &str) -> ServiceResult<i32> {
    match key {
        Some(key) if key > 0 => Ok(key),
        _ => Err(ServiceError::MalformedInput(format!(
            "{label} must be a positive number"
        ))),
    }
}
