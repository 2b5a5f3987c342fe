use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Submitted;

/// Suggested ticket types offered to forms.
pub const TICKET_TYPES: &[&str] = &["Adult", "VIP", "Student", "Child", "Senior", "Discounted"];

/// Suggested payment methods offered to forms.
pub const PAYMENT_METHODS: &[&str] = &["Cash", "Card", "Bank transfer", "Online", "Transfer"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub ticket_number: i32,
    pub service_number: i32,
    pub event_id: i32,
    pub sale_date: NaiveDate,
    pub ticket_type: String,
    pub payment_method: String,
}

/// A ticket joined with the names of the employee and event it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct TicketDetails {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub ticket: Ticket,
    pub employee_full_name: String,
    pub event_name: String,
}

/// Candidate ticket record as submitted for create or edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketDraft {
    #[serde(default)]
    pub ticket_number: Option<Submitted<i32>>,
    #[serde(default)]
    pub service_number: Option<Submitted<i32>>,
    #[serde(default)]
    pub event_id: Option<Submitted<i32>>,
    #[serde(default, deserialize_with = "super::date_input::deserialize")]
    pub sale_date: Option<Submitted<NaiveDateTime>>,
    #[serde(default)]
    pub ticket_type: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl TicketDraft {
    /// The submitted ticket number, if it is an integer.
    pub fn key(&self) -> Option<i32> {
        self.ticket_number.as_ref().and_then(Submitted::value)
    }

    pub fn to_ticket(&self) -> Option<Ticket> {
        Some(Ticket {
            ticket_number: self.key()?,
            service_number: self.service_number.as_ref()?.value()?,
            event_id: self.event_id.as_ref()?.value()?,
            sale_date: self.sale_date.as_ref()?.value()?.date(),
            ticket_type: self.ticket_type.as_deref()?.trim().to_string(),
            payment_method: self.payment_method.as_deref()?.trim().to_string(),
        })
    }
}

/// An option in a form dropdown: a key and the label shown for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: i32,
    pub label: String,
}

/// Everything a ticket form needs to offer choices.
#[derive(Debug, Clone, Serialize)]
pub struct TicketFormOptions {
    pub employees: Vec<SelectOption>,
    pub events: Vec<SelectOption>,
    pub ticket_types: &'static [&'static str],
    pub payment_methods: &'static [&'static str],
}
