use async_trait::async_trait;
use bson::doc;
use bson::oid::ObjectId;
use bson::Document;
use chrono::DateTime;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::Collection;
use mongodb::Database;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::event::errors::EventError;
use crate::domain::event::models::Event;
use crate::domain::event::models::EventFilter;
use crate::domain::event::models::EventId;
use crate::domain::event::models::EventSummary;
use crate::domain::event::models::ImageRef;
use crate::domain::event::models::NewEvent;
use crate::domain::event::ports::EventRepository;
use crate::domain::user::models::UserId;
use crate::outbound::repositories::mongo::EVENTS_COLLECTION;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    description: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    date: DateTime<Utc>,
    location: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    created_by: ObjectId,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    updated_at: DateTime<Utc>,
}

impl From<EventDocument> for Event {
    fn from(doc: EventDocument) -> Self {
        Event {
            id: EventId(doc.id),
            title: doc.title,
            description: doc.description,
            date: doc.date,
            location: doc.location,
            event_type: doc.event_type,
            image: doc.image.map(ImageRef::new),
            created_by: UserId(doc.created_by),
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

/// Listing projection as stored.
#[derive(Debug, Deserialize)]
struct EventSummaryDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    description: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    date: DateTime<Utc>,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    image: Option<String>,
}

impl From<EventSummaryDocument> for EventSummary {
    fn from(doc: EventSummaryDocument) -> Self {
        EventSummary {
            id: EventId(doc.id),
            title: doc.title,
            description: doc.description,
            date: doc.date,
            event_type: doc.event_type,
            image: doc.image.map(ImageRef::new),
        }
    }
}

pub struct MongoEventRepository {
    collection: Collection<EventDocument>,
}

impl MongoEventRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(EVENTS_COLLECTION),
        }
    }
}

fn search_filter(filter: &EventFilter) -> Document {
    let mut query = Document::new();
    if let Some(search) = &filter.search {
        query.insert("$text", doc! { "$search": search.as_str() });
    }
    if let Some(event_type) = &filter.event_type {
        query.insert("type", event_type.as_str());
    }
    query
}

#[async_trait]
impl EventRepository for MongoEventRepository {
    async fn create(&self, event: NewEvent) -> Result<Event, EventError> {
        let document = EventDocument {
            id: ObjectId::new(),
            title: event.title,
            description: event.description,
            date: event.date,
            location: event.location,
            event_type: event.event_type,
            image: event.image.map(ImageRef::into_inner),
            created_by: event.created_by.0,
            created_at: event.created_at,
            updated_at: event.updated_at,
        };

        self.collection
            .insert_one(&document, None)
            .await
            .map_err(|e| EventError::DatabaseError(e.to_string()))?;

        Ok(document.into())
    }

    async fn search(&self, filter: &EventFilter) -> Result<Vec<EventSummary>, EventError> {
        let options = FindOptions::builder()
            .projection(doc! {
                "_id": 1,
                "title": 1,
                "description": 1,
                "date": 1,
                "type": 1,
                "image": 1,
            })
            .sort(doc! { "date": -1 })
            .build();

        let cursor = self
            .collection
            .clone_with_type::<EventSummaryDocument>()
            .find(search_filter(filter), options)
            .await
            .map_err(|e| EventError::DatabaseError(e.to_string()))?;

        let documents: Vec<EventSummaryDocument> = cursor
            .try_collect()
            .await
            .map_err(|e| EventError::DatabaseError(e.to_string()))?;

        Ok(documents.into_iter().map(EventSummary::from).collect())
    }

    async fn list_all(&self) -> Result<Vec<Event>, EventError> {
        let options = FindOptions::builder().sort(doc! { "date": 1 }).build();

        let cursor = self
            .collection
            .find(doc! {}, options)
            .await
            .map_err(|e| EventError::DatabaseError(e.to_string()))?;

        let documents: Vec<EventDocument> = cursor
            .try_collect()
            .await
            .map_err(|e| EventError::DatabaseError(e.to_string()))?;

        Ok(documents.into_iter().map(Event::from).collect())
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, EventError> {
        let document = self
            .collection
            .find_one(doc! { "_id": id.0 }, None)
            .await
            .map_err(|e| EventError::DatabaseError(e.to_string()))?;

        Ok(document.map(Event::from))
    }

    async fn update(&self, event: &Event) -> Result<Event, EventError> {
        let mut changes = doc! {
            "title": event.title.as_str(),
            "description": event.description.as_str(),
            "date": bson::DateTime::from_chrono(event.date),
            "location": event.location.as_str(),
            "updatedAt": bson::DateTime::from_chrono(event.updated_at),
        };
        if let Some(image) = &event.image {
            changes.insert("image", image.as_str());
        }

        let result = self
            .collection
            .update_one(doc! { "_id": event.id.0 }, doc! { "$set": changes }, None)
            .await
            .map_err(|e| EventError::DatabaseError(e.to_string()))?;

        if result.matched_count == 0 {
            return Err(EventError::NotFound(event.id.to_string()));
        }

        self.find_by_id(&event.id)
            .await?
            .ok_or(EventError::NotFound(event.id.to_string()))
    }

    async fn delete(&self, id: &EventId) -> Result<(), EventError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id.0 }, None)
            .await
            .map_err(|e| EventError::DatabaseError(e.to_string()))?;

        if result.deleted_count == 0 {
            return Err(EventError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
