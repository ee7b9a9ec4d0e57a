//! In-process stores selected with `database.backend = "memory"`.
//!
//! Each operation takes the lock once, so every call is atomic like a
//! single-document write.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::event::errors::EventError;
use crate::domain::event::models::Event;
use crate::domain::event::models::EventFilter;
use crate::domain::event::models::EventId;
use crate::domain::event::models::EventSummary;
use crate::domain::event::models::NewEvent;
use crate::domain::event::ports::EventRepository;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::outbound::repositories::text_index::TextIndex;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if users.values().any(|existing| existing.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email));
        }

        let user = user.with_id(UserId::new());
        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }
}

#[derive(Default)]
struct EventState {
    events: HashMap<EventId, Event>,
    index: TextIndex<EventId>,
}

impl EventState {
    fn reindex(&mut self, event: &Event) {
        self.index
            .insert(event.id, &format!("{} {}", event.title, event.event_type));
    }
}

#[derive(Default)]
pub struct InMemoryEventRepository {
    state: RwLock<EventState>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn create(&self, event: NewEvent) -> Result<Event, EventError> {
        let event = event.with_id(EventId::new());

        let mut state = self.state.write().await;
        state.reindex(&event);
        state.events.insert(event.id, event.clone());

        Ok(event)
    }

    async fn search(&self, filter: &EventFilter) -> Result<Vec<EventSummary>, EventError> {
        let state = self.state.read().await;

        let text_matches = filter
            .search
            .as_deref()
            .map(|query| state.index.search(query));

        let mut summaries: Vec<EventSummary> = state
            .events
            .values()
            .filter(|event| {
                text_matches
                    .as_ref()
                    .map_or(true, |ids| ids.contains(&event.id))
            })
            .filter(|event| {
                filter
                    .event_type
                    .as_deref()
                    .map_or(true, |t| event.event_type == t)
            })
            .map(EventSummary::from)
            .collect();

        summaries.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(summaries)
    }

    async fn list_all(&self) -> Result<Vec<Event>, EventError> {
        let mut events: Vec<Event> = self.state.read().await.events.values().cloned().collect();
        events.sort_by_key(|event| event.date);

        Ok(events)
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, EventError> {
        Ok(self.state.read().await.events.get(id).cloned())
    }

    async fn update(&self, event: &Event) -> Result<Event, EventError> {
        let mut state = self.state.write().await;

        let stored = state
            .events
            .get_mut(&event.id)
            .ok_or(EventError::NotFound(event.id.to_string()))?;

        stored.title = event.title.clone();
        stored.description = event.description.clone();
        stored.date = event.date;
        stored.location = event.location.clone();
        stored.updated_at = event.updated_at;
        if event.image.is_some() {
            stored.image = event.image.clone();
        }

        let updated = stored.clone();
        state.reindex(&updated);

        Ok(updated)
    }

    async fn delete(&self, id: &EventId) -> Result<(), EventError> {
        let mut state = self.state.write().await;

        state
            .events
            .remove(id)
            .ok_or(EventError::NotFound(id.to_string()))?;
        state.index.remove(id);

        Ok(())
    }
}
