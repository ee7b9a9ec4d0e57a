use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::AuthResponseData;
use crate::domain::user::models::RegisterCommand;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequestBody>,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    let command = RegisterCommand::new(body.name, body.email, body.password)?;

    let session = state.auth_service.register(command).await?;

    Ok(ApiSuccess::new(
        StatusCode::CREATED,
        AuthResponseData {
            user: (&session.user).into(),
            token: session.token,
        },
    ))
}

/// HTTP request body for registration (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequestBody {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}
