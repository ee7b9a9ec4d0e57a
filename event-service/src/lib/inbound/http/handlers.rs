use auth::JwtError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::event::errors::EventError;
use crate::domain::event::errors::ImageError;
use crate::domain::event::models::Event;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::User;

pub mod create_event;
pub mod current_user;
pub mod delete_event;
pub mod form;
pub mod get_event;
pub mod health;
pub mod list_events;
pub mod login;
pub mod register;
pub mod update_event;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(detail) => {
                tracing::error!("Internal server error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                )
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        (status, Json(ApiErrorData { message })).into_response()
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::TokenExpired => ApiError::Unauthorized("Token has expired".to_string()),
            JwtError::InvalidToken(_) => ApiError::Unauthorized("Token is not valid".to_string()),
            JwtError::MissingSecret | JwtError::EncodingFailed(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::MissingFields(_) => ApiError::BadRequest(err.to_string()),
            UserError::EmailAlreadyExists(_) => {
                ApiError::BadRequest("User already exists".to_string())
            }
            UserError::InvalidCredentials => {
                ApiError::BadRequest("Invalid credentials".to_string())
            }
            UserError::NotFound(_) | UserError::InvalidUserId(_) => {
                ApiError::NotFound("User not found".to_string())
            }
            UserError::Token(e) => e.into(),
            UserError::Password(_) | UserError::DatabaseError(_) | UserError::Unknown(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<EventError> for ApiError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::MissingFields(_) | EventError::InvalidDate(_) => {
                ApiError::BadRequest(err.to_string())
            }
            EventError::NotFound(_) | EventError::InvalidEventId(_) => {
                ApiError::NotFound("Event not found".to_string())
            }
            EventError::Forbidden { .. } => ApiError::Forbidden("Not authorized".to_string()),
            EventError::Image(ImageError::UnsupportedType(_) | ImageError::TooLarge { .. }) => {
                ApiError::BadRequest(err.to_string())
            }
            EventError::Image(ImageError::Io(_))
            | EventError::DatabaseError(_)
            | EventError::Unknown(_) => ApiError::InternalServerError(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageData {
    pub message: String,
}

/// Public part of a user returned alongside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummaryData {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserSummaryData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthResponseData {
    pub token: String,
    pub user: UserSummaryData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub image: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Event> for EventData {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.to_string(),
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date,
            location: event.location.clone(),
            event_type: event.event_type.clone(),
            image: event.image.as_ref().map(|image| image.to_string()),
            created_by: event.created_by.to_string(),
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;
    use crate::domain::event::errors::EventIdError;

    async fn body_of(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let (status, body) =
            body_of(ApiError::InternalServerError("connection refused".to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Server error");
    }

    #[test]
    fn test_login_failures_share_one_message() {
        assert_eq!(
            ApiError::from(UserError::InvalidCredentials),
            ApiError::BadRequest("Invalid credentials".to_string())
        );
    }

    #[test]
    fn test_malformed_event_id_is_not_found() {
        let err = EventError::InvalidEventId(EventIdError::InvalidFormat("x".to_string()));

        assert_eq!(
            ApiError::from(err),
            ApiError::NotFound("Event not found".to_string())
        );
    }

    #[test]
    fn test_forbidden_maps_to_403() {
        let err = EventError::Forbidden {
            event_id: "e".to_string(),
            user_id: "u".to_string(),
        };

        assert_eq!(
            ApiError::from(err),
            ApiError::Forbidden("Not authorized".to_string())
        );
    }

    #[test]
    fn test_rejected_image_is_bad_request() {
        let err = EventError::Image(ImageError::UnsupportedType("text/plain".to_string()));

        assert!(matches!(ApiError::from(err), ApiError::BadRequest(_)));
    }

    #[test]
    fn test_expired_token_message() {
        assert_eq!(
            ApiError::from(JwtError::TokenExpired),
            ApiError::Unauthorized("Token has expired".to_string())
        );
    }
}
