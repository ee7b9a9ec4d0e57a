use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::event::errors::EventError;
use crate::domain::event::models::CreateEventCommand;
use crate::domain::event::models::Event;
use crate::domain::event::models::EventFilter;
use crate::domain::event::models::EventId;
use crate::domain::event::models::EventInput;
use crate::domain::event::models::EventSummary;
use crate::domain::event::models::ImageRef;
use crate::domain::event::models::ImageUpload;
use crate::domain::event::models::NewEvent;
use crate::domain::event::models::UpdateEventCommand;
use crate::domain::event::policy;
use crate::domain::event::ports::EventRepository;
use crate::domain::event::ports::EventServicePort;
use crate::domain::event::ports::ImageStore;
use crate::domain::user::models::UserId;

/// Domain service implementation for event operations.
pub struct EventService<ER, IS>
where
    ER: EventRepository,
    IS: ImageStore,
{
    repository: Arc<ER>,
    image_store: Arc<IS>,
}

impl<ER, IS> EventService<ER, IS>
where
    ER: EventRepository,
    IS: ImageStore,
{
    /// Create a new event service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Event persistence implementation
    /// * `image_store` - Uploaded image storage
    pub fn new(repository: Arc<ER>, image_store: Arc<IS>) -> Self {
        Self {
            repository,
            image_store,
        }
    }

    async fn owned_event(&self, id: &EventId, caller: &UserId) -> Result<Event, EventError> {
        let event = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(EventError::NotFound(id.to_string()))?;

        policy::authorize(&event, caller)?;

        Ok(event)
    }

    /// Remove an image stored for a write the repository then rejected.
    async fn discard_image(&self, image: Option<&ImageRef>) {
        if let Some(image) = image {
            if let Err(e) = self.image_store.remove(image).await {
                tracing::warn!(image = %image, error = %e, "Failed to remove orphaned image");
            }
        }
    }
}

#[async_trait]
impl<ER, IS> EventServicePort for EventService<ER, IS>
where
    ER: EventRepository,
    IS: ImageStore,
{
    async fn create_event(
        &self,
        command: CreateEventCommand,
        creator: &UserId,
        image: Option<ImageUpload>,
    ) -> Result<Event, EventError> {
        let image = match image {
            Some(upload) => Some(self.image_store.store(upload).await?),
            None => None,
        };

        let now = Utc::now();
        let result = self
            .repository
            .create(NewEvent {
                title: command.title,
                description: command.description,
                date: command.date,
                location: command.location,
                event_type: command.event_type,
                image: image.clone(),
                created_by: *creator,
                created_at: now,
                updated_at: now,
            })
            .await;

        let event = match result {
            Ok(event) => event,
            Err(e) => {
                self.discard_image(image.as_ref()).await;
                return Err(e);
            }
        };

        tracing::info!(event_id = %event.id, created_by = %creator, "Event created");

        Ok(event)
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<EventSummary>, EventError> {
        self.repository.search(filter).await
    }

    async fn list_all_events(&self) -> Result<Vec<Event>, EventError> {
        self.repository.list_all().await
    }

    async fn get_event(&self, id: &EventId) -> Result<Event, EventError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(EventError::NotFound(id.to_string()))
    }

    async fn update_event(
        &self,
        id: &EventId,
        input: EventInput,
        caller: &UserId,
        image: Option<ImageUpload>,
    ) -> Result<Event, EventError> {
        let mut event = self.owned_event(id, caller).await?;

        UpdateEventCommand::try_from_input(input)?.apply_to(&mut event);

        let new_image = match image {
            Some(upload) => Some(self.image_store.store(upload).await?),
            None => None,
        };

        if let Some(image) = &new_image {
            event.image = Some(image.clone());
        }

        event.updated_at = Utc::now();

        let updated = match self.repository.update(&event).await {
            Ok(updated) => updated,
            Err(e) => {
                self.discard_image(new_image.as_ref()).await;
                return Err(e);
            }
        };

        tracing::info!(event_id = %updated.id, "Event updated");

        Ok(updated)
    }

    async fn delete_event(&self, id: &EventId, caller: &UserId) -> Result<(), EventError> {
        self.owned_event(id, caller).await?;

        // The stored image file is left on disk.
        self.repository.delete(id).await?;

        tracing::info!(event_id = %id, "Event deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use chrono::Duration;
    use chrono::TimeZone;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::domain::event::errors::ImageError;

    mock! {
        pub TestEventRepository {}

        #[async_trait]
        impl EventRepository for TestEventRepository {
            async fn create(&self, event: NewEvent) -> Result<Event, EventError>;
            async fn search(&self, filter: &EventFilter) -> Result<Vec<EventSummary>, EventError>;
            async fn list_all(&self) -> Result<Vec<Event>, EventError>;
            async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, EventError>;
            async fn update(&self, event: &Event) -> Result<Event, EventError>;
            async fn delete(&self, id: &EventId) -> Result<(), EventError>;
        }
    }

    mock! {
        pub TestImageStore {}

        #[async_trait]
        impl ImageStore for TestImageStore {
            async fn store(&self, upload: ImageUpload) -> Result<ImageRef, ImageError>;
            async fn remove(&self, image: &ImageRef) -> Result<(), ImageError>;
        }
    }

    fn create_command() -> CreateEventCommand {
        CreateEventCommand {
            title: "Robotic Arms Workshop".to_string(),
            description: "Build a gripper".to_string(),
            date: Utc.with_ymd_and_hms(2025, 5, 1, 15, 0, 0).unwrap(),
            location: "Lab 3".to_string(),
            event_type: "Workshop".to_string(),
        }
    }

    fn stored_event(owner: UserId) -> Event {
        let created = Utc::now() - Duration::hours(1);
        Event {
            id: EventId::new(),
            title: "Robotic Arms Workshop".to_string(),
            description: "Build a gripper".to_string(),
            date: Utc.with_ymd_and_hms(2025, 5, 1, 15, 0, 0).unwrap(),
            location: "Lab 3".to_string(),
            event_type: "Workshop".to_string(),
            image: None,
            created_by: owner,
            created_at: created,
            updated_at: created,
        }
    }

    fn png_upload() -> ImageUpload {
        ImageUpload {
            file_name: Some("poster.png".to_string()),
            content_type: "image/png".to_string(),
            data: Bytes::from_static(b"\x89PNG"),
        }
    }

    #[tokio::test]
    async fn test_create_event_sets_creator() {
        let mut repository = MockTestEventRepository::new();
        let mut image_store = MockTestImageStore::new();
        let creator = UserId::new();

        repository
            .expect_create()
            .withf(move |event| {
                event.created_by == creator
                    && event.created_at == event.updated_at
                    && event.image.is_none()
            })
            .times(1)
            .returning(|event| Ok(event.with_id(EventId::new())));

        image_store.expect_store().times(0);

        let service = EventService::new(Arc::new(repository), Arc::new(image_store));

        let event = service
            .create_event(create_command(), &creator, None)
            .await
            .unwrap();

        assert_eq!(event.created_by, creator);
        assert_eq!(event.event_type, "Workshop");
    }

    #[tokio::test]
    async fn test_create_event_with_image() {
        let mut repository = MockTestEventRepository::new();
        let mut image_store = MockTestImageStore::new();

        image_store
            .expect_store()
            .withf(|upload| upload.content_type == "image/png")
            .times(1)
            .returning(|_| Ok(ImageRef::new("1700000000000-abc.png")));

        repository
            .expect_create()
            .withf(|event| {
                event.image.as_ref().map(ImageRef::as_str) == Some("1700000000000-abc.png")
            })
            .times(1)
            .returning(|event| Ok(event.with_id(EventId::new())));

        let service = EventService::new(Arc::new(repository), Arc::new(image_store));

        let event = service
            .create_event(create_command(), &UserId::new(), Some(png_upload()))
            .await
            .unwrap();

        assert!(event.image.is_some());
    }

    #[tokio::test]
    async fn test_create_event_rejected_image_is_not_persisted() {
        let mut repository = MockTestEventRepository::new();
        let mut image_store = MockTestImageStore::new();

        image_store
            .expect_store()
            .times(1)
            .returning(|upload| Err(ImageError::UnsupportedType(upload.content_type)));

        repository.expect_create().times(0);

        let service = EventService::new(Arc::new(repository), Arc::new(image_store));

        let result = service
            .create_event(create_command(), &UserId::new(), Some(png_upload()))
            .await;

        assert!(matches!(
            result,
            Err(EventError::Image(ImageError::UnsupportedType(_)))
        ));
    }

    #[tokio::test]
    async fn test_create_event_failure_removes_stored_image() {
        let mut repository = MockTestEventRepository::new();
        let mut image_store = MockTestImageStore::new();

        image_store
            .expect_store()
            .times(1)
            .returning(|_| Ok(ImageRef::new("1700000000000-abc.png")));

        repository
            .expect_create()
            .times(1)
            .returning(|_| Err(EventError::DatabaseError("connection reset".to_string())));

        image_store
            .expect_remove()
            .withf(|image| image.as_str() == "1700000000000-abc.png")
            .times(1)
            .returning(|_| Ok(()));

        let service = EventService::new(Arc::new(repository), Arc::new(image_store));

        let result = service
            .create_event(create_command(), &UserId::new(), Some(png_upload()))
            .await;

        assert!(matches!(result, Err(EventError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn test_get_event_not_found() {
        let mut repository = MockTestEventRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = EventService::new(Arc::new(repository), Arc::new(MockTestImageStore::new()));

        let result = service.get_event(&EventId::new()).await;
        assert!(matches!(result, Err(EventError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_event_by_creator() {
        let mut repository = MockTestEventRepository::new();
        let owner = UserId::new();
        let existing = stored_event(owner);
        let event_id = existing.id;
        let previous_update = existing.updated_at;

        repository
            .expect_find_by_id()
            .withf(move |id| *id == event_id)
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));

        repository
            .expect_update()
            .withf(move |event| {
                event.title == "Soft Robotics Workshop"
                    && event.event_type == "Workshop"
                    && event.created_by == owner
                    && event.updated_at > previous_update
            })
            .times(1)
            .returning(|event| Ok(event.clone()));

        let service = EventService::new(Arc::new(repository), Arc::new(MockTestImageStore::new()));

        let input = EventInput {
            title: Some("Soft Robotics Workshop".to_string()),
            event_type: Some("Seminar".to_string()),
            ..Default::default()
        };

        let updated = service
            .update_event(&event_id, input, &owner, None)
            .await
            .unwrap();

        assert_eq!(updated.title, "Soft Robotics Workshop");
        assert_eq!(updated.location, "Lab 3");
        assert!(updated.updated_at > previous_update);
    }

    #[tokio::test]
    async fn test_update_event_forbidden_for_other_user() {
        let mut repository = MockTestEventRepository::new();
        let mut image_store = MockTestImageStore::new();
        let existing = stored_event(UserId::new());

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));

        repository.expect_update().times(0);
        image_store.expect_store().times(0);

        let service = EventService::new(Arc::new(repository), Arc::new(image_store));

        let result = service
            .update_event(
                &EventId::new(),
                EventInput {
                    date: Some("not-a-date".to_string()),
                    ..Default::default()
                },
                &UserId::new(),
                Some(png_upload()),
            )
            .await;

        assert!(matches!(result, Err(EventError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_update_unknown_event_reports_not_found_before_validation() {
        let mut repository = MockTestEventRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        repository.expect_update().times(0);

        let service = EventService::new(Arc::new(repository), Arc::new(MockTestImageStore::new()));

        let result = service
            .update_event(
                &EventId::new(),
                EventInput {
                    title: Some("   ".to_string()),
                    ..Default::default()
                },
                &UserId::new(),
                None,
            )
            .await;

        assert!(matches!(result, Err(EventError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_with_invalid_date_stores_nothing() {
        let mut repository = MockTestEventRepository::new();
        let mut image_store = MockTestImageStore::new();
        let owner = UserId::new();
        let existing = stored_event(owner);
        let event_id = existing.id;

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));

        repository.expect_update().times(0);
        image_store.expect_store().times(0);

        let service = EventService::new(Arc::new(repository), Arc::new(image_store));

        let result = service
            .update_event(
                &event_id,
                EventInput {
                    date: Some("not-a-date".to_string()),
                    ..Default::default()
                },
                &owner,
                Some(png_upload()),
            )
            .await;

        assert!(matches!(result, Err(EventError::InvalidDate(_))));
    }

    #[tokio::test]
    async fn test_update_failure_removes_new_image() {
        let mut repository = MockTestEventRepository::new();
        let mut image_store = MockTestImageStore::new();
        let owner = UserId::new();
        let existing = stored_event(owner);
        let event_id = existing.id;

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));

        repository
            .expect_update()
            .times(1)
            .returning(|_| Err(EventError::DatabaseError("connection reset".to_string())));

        image_store
            .expect_store()
            .times(1)
            .returning(|_| Ok(ImageRef::new("1700000000000-new.png")));

        image_store
            .expect_remove()
            .withf(|image| image.as_str() == "1700000000000-new.png")
            .times(1)
            .returning(|_| Ok(()));

        let service = EventService::new(Arc::new(repository), Arc::new(image_store));

        let result = service
            .update_event(&event_id, EventInput::default(), &owner, Some(png_upload()))
            .await;

        assert!(matches!(result, Err(EventError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn test_delete_event_by_creator() {
        let mut repository = MockTestEventRepository::new();
        let owner = UserId::new();
        let existing = stored_event(owner);
        let event_id = existing.id;

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));

        repository
            .expect_delete()
            .with(eq(event_id))
            .times(1)
            .returning(|_| Ok(()));

        let service = EventService::new(Arc::new(repository), Arc::new(MockTestImageStore::new()));

        assert!(service.delete_event(&event_id, &owner).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_event_forbidden_for_other_user() {
        let mut repository = MockTestEventRepository::new();
        let existing = stored_event(UserId::new());
        let event_id = existing.id;

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));

        repository.expect_delete().times(0);

        let service = EventService::new(Arc::new(repository), Arc::new(MockTestImageStore::new()));

        let result = service.delete_event(&event_id, &UserId::new()).await;
        assert!(matches!(result, Err(EventError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_delete_event_not_found() {
        let mut repository = MockTestEventRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = EventService::new(Arc::new(repository), Arc::new(MockTestImageStore::new()));

        let result = service.delete_event(&EventId::new(), &UserId::new()).await;
        assert!(matches!(result, Err(EventError::NotFound(_))));
    }
}
