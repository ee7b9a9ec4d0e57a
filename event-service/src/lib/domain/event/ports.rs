use async_trait::async_trait;

use crate::domain::event::errors::EventError;
use crate::domain::event::errors::ImageError;
use crate::domain::event::models::CreateEventCommand;
use crate::domain::event::models::Event;
use crate::domain::event::models::EventFilter;
use crate::domain::event::models::EventId;
use crate::domain::event::models::EventInput;
use crate::domain::event::models::EventSummary;
use crate::domain::event::models::ImageRef;
use crate::domain::event::models::ImageUpload;
use crate::domain::event::models::NewEvent;
use crate::domain::user::models::UserId;

/// Port for event operations.
#[async_trait]
pub trait EventServicePort: Send + Sync + 'static {
    /// Create an event owned by `creator`, storing the image first when supplied.
    ///
    /// # Errors
    /// * `Image` - Image rejected or could not be stored
    /// * `DatabaseError` - Database operation failed
    async fn create_event(
        &self,
        command: CreateEventCommand,
        creator: &UserId,
        image: Option<ImageUpload>,
    ) -> Result<Event, EventError>;

    /// List event summaries matching the filter, most recent date first.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<EventSummary>, EventError>;

    /// List every event in full, earliest date first.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_all_events(&self) -> Result<Vec<Event>, EventError>;

    /// Retrieve event by identifier.
    ///
    /// # Errors
    /// * `NotFound` - Event does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_event(&self, id: &EventId) -> Result<Event, EventError>;

    /// Apply a partial update on behalf of `caller`.
    ///
    /// The submitted fields are only validated once the caller is known to own the event.
    ///
    /// # Errors
    /// * `NotFound` - Event does not exist
    /// * `Forbidden` - Caller did not create the event
    /// * `MissingFields` / `InvalidDate` - A supplied field is blank or unparseable
    /// * `Image` - Image rejected or could not be stored
    /// * `DatabaseError` - Database operation failed
    async fn update_event(
        &self,
        id: &EventId,
        input: EventInput,
        caller: &UserId,
        image: Option<ImageUpload>,
    ) -> Result<Event, EventError>;

    /// Delete an event on behalf of `caller`.
    ///
    /// # Errors
    /// * `NotFound` - Event does not exist
    /// * `Forbidden` - Caller did not create the event
    /// * `DatabaseError` - Database operation failed
    async fn delete_event(&self, id: &EventId, caller: &UserId) -> Result<(), EventError>;
}

/// Persistence operations for events.
#[async_trait]
pub trait EventRepository: Send + Sync + 'static {
    /// Persist a new event; the store assigns the identifier.
    async fn create(&self, event: NewEvent) -> Result<Event, EventError>;

    /// Text and type filtered listing, projected to summaries, date descending.
    async fn search(&self, filter: &EventFilter) -> Result<Vec<EventSummary>, EventError>;

    /// Every event, date ascending.
    async fn list_all(&self) -> Result<Vec<Event>, EventError>;

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, EventError>;

    /// Overwrite the mutable fields of an existing event.
    ///
    /// Only title, description, date, location, image and updatedAt are written.
    ///
    /// # Errors
    /// * `NotFound` - No event with this identifier
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, event: &Event) -> Result<Event, EventError>;

    /// # Errors
    /// * `NotFound` - No event with this identifier
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &EventId) -> Result<(), EventError>;
}

/// Storage for uploaded event images.
#[async_trait]
pub trait ImageStore: Send + Sync + 'static {
    /// Validate and persist an upload, returning the stored reference.
    ///
    /// # Errors
    /// * `UnsupportedType` - MIME type not in the allow-list
    /// * `TooLarge` - Upload exceeds the configured limit
    /// * `Io` - Writing the file failed
    async fn store(&self, upload: ImageUpload) -> Result<ImageRef, ImageError>;

    /// Delete a previously stored image. A missing file is not an error.
    async fn remove(&self, image: &ImageRef) -> Result<(), ImageError>;
}
