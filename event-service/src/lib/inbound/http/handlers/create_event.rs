use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::form::EventForm;
use super::ApiError;
use super::ApiSuccess;
use super::EventData;
use crate::domain::event::policy;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn create_event(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    form: EventForm,
) -> Result<ApiSuccess<EventData>, ApiError> {
    // Fields are checked before the image is written anywhere.
    let command = policy::validate_required(form.input)?;

    state
        .event_service
        .create_event(command, &caller.user_id, form.image)
        .await
        .map_err(ApiError::from)
        .map(|ref event| ApiSuccess::new(StatusCode::CREATED, event.into()))
}
