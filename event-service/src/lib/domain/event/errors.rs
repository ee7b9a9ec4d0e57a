use thiserror::Error;

/// Error for EventId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventIdError {
    #[error("Invalid ObjectId format: {0}")]
    InvalidFormat(String),
}

/// Image upload rejection or storage failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("Image too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: usize, max: usize },

    #[error("Image storage failed: {0}")]
    Io(String),
}

/// Top-level error for all event operations
#[derive(Debug, Clone, Error)]
pub enum EventError {
    // Input errors
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid event ID: {0}")]
    InvalidEventId(#[from] EventIdError),

    // Domain-level errors
    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("User {user_id} is not allowed to modify event {event_id}")]
    Forbidden { event_id: String, user_id: String },

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
