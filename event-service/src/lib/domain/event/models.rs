use std::fmt;

use bson::oid::ObjectId;
use bytes::Bytes;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::Utc;

use crate::domain::event::errors::EventError;
use crate::domain::event::errors::EventIdError;
use crate::domain::user::models::UserId;

/// Campus event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub event_type: String,
    pub image: Option<ImageRef>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing projection of an event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSummary {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub event_type: String,
    pub image: Option<ImageRef>,
}

impl From<&Event> for EventSummary {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date,
            event_type: event.event_type.clone(),
            image: event.image.clone(),
        }
    }
}

/// Event unique identifier, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(pub ObjectId);

impl EventId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    /// Parse an event ID from its 24-character hex form.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid ObjectId
    pub fn from_string(s: &str) -> Result<Self, EventIdError> {
        ObjectId::parse_str(s)
            .map(EventId)
            .map_err(|e| EventIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

/// Stored image filename, served under `/uploads/<filename>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self(file_name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Event record ready to be persisted; the store assigns the identifier.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub event_type: String,
    pub image: Option<ImageRef>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewEvent {
    pub fn with_id(self, id: EventId) -> Event {
        Event {
            id,
            title: self.title,
            description: self.description,
            date: self.date,
            location: self.location,
            event_type: self.event_type,
            image: self.image,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Raw event fields as submitted by a client.
#[derive(Debug, Clone, Default)]
pub struct EventInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub event_type: Option<String>,
}

/// Validated command to create an event.
#[derive(Debug, Clone)]
pub struct CreateEventCommand {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub event_type: String,
}

/// Validated partial update of an event.
///
/// The event type and creator cannot be changed after creation.
#[derive(Debug, Clone, Default)]
pub struct UpdateEventCommand {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

impl UpdateEventCommand {
    /// Build an update from submitted fields; absent fields are left untouched.
    ///
    /// # Errors
    /// * `MissingFields` - A supplied field is blank
    /// * `InvalidDate` - The supplied date is unparseable
    pub fn try_from_input(input: EventInput) -> Result<Self, EventError> {
        let mut blank = Vec::new();
        let title = non_blank(input.title, "title", &mut blank);
        let description = non_blank(input.description, "description", &mut blank);
        let date = non_blank(input.date, "date", &mut blank);
        let location = non_blank(input.location, "location", &mut blank);

        if !blank.is_empty() {
            return Err(EventError::MissingFields(blank));
        }

        let date = date.as_deref().map(parse_event_date).transpose()?;

        Ok(Self {
            title,
            description,
            date,
            location,
        })
    }

    /// Overwrite the supplied fields on `event`.
    pub fn apply_to(self, event: &mut Event) {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(location) = self.location {
            event.location = location;
        }
    }
}

fn non_blank(
    value: Option<String>,
    field: &'static str,
    blank: &mut Vec<&'static str>,
) -> Option<String> {
    match value {
        Some(v) if v.trim().is_empty() => {
            blank.push(field);
            None
        }
        other => other,
    }
}

/// Listing filter. Blank values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub search: Option<String>,
    pub event_type: Option<String>,
}

impl EventFilter {
    pub fn new(search: Option<String>, event_type: Option<String>) -> Self {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            search: present(search),
            event_type: present(event_type),
        }
    }
}

/// Image file received with an event submission.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub data: Bytes,
}

/// Parse an event date.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` read as UTC, and `YYYY-MM-DD` as UTC midnight.
///
/// # Errors
/// * `InvalidDate` - None of the accepted forms match
pub fn parse_event_date(raw: &str) -> Result<DateTime<Utc>, EventError> {
    let raw = raw.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(date.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| EventError::InvalidDate(raw.to_string()))
}
