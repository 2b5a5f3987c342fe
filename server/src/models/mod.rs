pub mod employee;
pub mod event;
pub mod ticket;

pub use employee::{Employee, EmployeeDraft, EmployeeView};
pub use event::{Event, EventDraft, EVENT_TYPES};
pub use ticket::{Ticket, TicketDetails, TicketDraft, TicketFormOptions, PAYMENT_METHODS, TICKET_TYPES};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A draft field as the caller sent it.
///
/// Values of the wrong shape are kept verbatim instead of failing the whole
/// body, so validation can report them next to every other field error and
/// echo them back in the candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Submitted<T> {
    Parsed(T),
    Unparsed(Value),
}

impl<T: Copy> Submitted<T> {
    /// The parsed value, if the input had the right shape.
    pub fn value(&self) -> Option<T> {
        match self {
            Submitted::Parsed(value) => Some(*value),
            Submitted::Unparsed(_) => None,
        }
    }
}

impl<T> From<T> for Submitted<T> {
    fn from(value: T) -> Self {
        Submitted::Parsed(value)
    }
}

/// Lenient date input for drafts.
///
/// Accepts a plain `YYYY-MM-DD` date or an ISO-8601 date-time (with or without
/// an offset). Blank strings and `null` deserialize to `None`; anything else
/// that does not parse is kept as [`Submitted::Unparsed`].
pub mod date_input {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::Submitted;

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<Option<Submitted<NaiveDateTime>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<Value> = Option::deserialize(deserializer)?;
        Ok(match raw {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => {
                let parsed = parse(text.trim());
                match parsed {
                    Some(at) => Some(Submitted::Parsed(at)),
                    None if text.trim().is_empty() => None,
                    None => Some(Submitted::Unparsed(Value::String(text))),
                }
            }
            Some(other) => Some(Submitted::Unparsed(other)),
        })
    }

    pub fn parse(value: &str) -> Option<NaiveDateTime> {
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return date.and_hms_opt(0, 0, 0);
        }
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
            return Some(with_offset.naive_local());
        }
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
            .ok()
    }

}
