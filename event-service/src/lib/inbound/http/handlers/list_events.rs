use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::EventData;
use crate::domain::event::models::EventFilter;
use crate::domain::event::models::EventSummary;
use crate::inbound::http::router::AppState;

/// `GET /api/events?search=&type=`
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<ListEventsParams>,
) -> Result<ApiSuccess<Vec<EventSummaryData>>, ApiError> {
    let filter = EventFilter::new(params.search, params.event_type);

    let events = state.event_service.list_events(&filter).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        events.iter().map(EventSummaryData::from).collect(),
    ))
}

/// `GET /api/events/debug/all`: every event in full, earliest first.
pub async fn list_all_events(
    State(state): State<AppState>,
) -> Result<ApiSuccess<Vec<EventData>>, ApiError> {
    let events = state.event_service.list_all_events().await?;

    tracing::debug!(count = events.len(), "Listing all events");

    Ok(ApiSuccess::new(
        StatusCode::OK,
        events.iter().map(EventData::from).collect(),
    ))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEventsParams {
    search: Option<String>,
    #[serde(rename = "type")]
    event_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummaryData {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub image: Option<String>,
}

impl From<&EventSummary> for EventSummaryData {
    fn from(summary: &EventSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            title: summary.title.clone(),
            description: summary.description.clone(),
            date: summary.date,
            event_type: summary.event_type.clone(),
            image: summary.image.as_ref().map(|image| image.to_string()),
        }
    }
}
