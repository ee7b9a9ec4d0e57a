//! Ownership and creation-time validation rules for events.

use crate::domain::event::errors::EventError;
use crate::domain::event::models::parse_event_date;
use crate::domain::event::models::CreateEventCommand;
use crate::domain::event::models::Event;
use crate::domain::event::models::EventInput;
use crate::domain::user::models::UserId;

/// Allow a mutation only when the caller created the event.
///
/// # Errors
/// * `Forbidden` - Caller is not the creator
pub fn authorize(event: &Event, caller: &UserId) -> Result<(), EventError> {
    if event.created_by == *caller {
        Ok(())
    } else {
        Err(EventError::Forbidden {
            event_id: event.id.to_string(),
            user_id: caller.to_string(),
        })
    }
}

/// Check that every creation field is present and the date parses.
///
/// # Errors
/// * `MissingFields` - Absent or blank fields, in declaration order
/// * `InvalidDate` - Date is present but unparseable
pub fn validate_required(input: EventInput) -> Result<CreateEventCommand, EventError> {
    let mut missing = Vec::new();
    let mut take = |value: Option<String>, field: &'static str| match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => {
            missing.push(field);
            String::new()
        }
    };

    let title = take(input.title, "title");
    let description = take(input.description, "description");
    let date = take(input.date, "date");
    let location = take(input.location, "location");
    let event_type = take(input.event_type, "type");

    if !missing.is_empty() {
        return Err(EventError::MissingFields(missing));
    }

    Ok(CreateEventCommand {
        title,
        description,
        date: parse_event_date(&date)?,
        location,
        event_type,
    })
}
