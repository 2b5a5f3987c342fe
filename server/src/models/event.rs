use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Submitted;

/// Suggested event categories offered to forms. Not enforced beyond length.
pub const EVENT_TYPES: &[&str] = &[
    "Conference",
    "Seminar",
    "Training",
    "Webinar",
    "Exhibition",
    "Forum",
    "Presentation",
    "Round table",
    "Workshop",
    "Festival",
    "Lecture",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i32,
    pub name: String,
    pub event_date: NaiveDate,
    pub event_type: String,
}

/// Candidate event record as submitted for create or edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDraft {
    #[serde(default)]
    pub id: Option<Submitted<i32>>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::date_input::deserialize")]
    pub event_date: Option<Submitted<NaiveDateTime>>,
    #[serde(default)]
    pub event_type: Option<String>,
}

impl EventDraft {
    /// The submitted event ID, if it is an integer.
    pub fn key(&self) -> Option<i32> {
        self.id.as_ref().and_then(Submitted::value)
    }

    /// Builds the record once every field is present. The date loses its
    /// time of day.
    pub fn to_event(&self) -> Option<Event> {
        Some(Event {
            id: self.key()?,
            name: self.name.as_deref()?.trim().to_string(),
            event_date: self.event_date.as_ref()?.value()?.date(),
            event_type: self.event_type.as_deref()?.trim().to_string(),
        })
    }
}
