use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::domain::event::errors::EventError;
use crate::domain::event::models::EventId;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn delete_event(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(event_id): Path<String>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let event_id = EventId::from_string(&event_id).map_err(EventError::from)?;

    state
        .event_service
        .delete_event(&event_id, &caller.user_id)
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageData {
            message: "Event deleted successfully".to_string(),
        },
    ))
}
