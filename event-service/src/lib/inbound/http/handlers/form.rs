//! Event submission body: `multipart/form-data` with an optional `image` file part, or JSON.

use axum::async_trait;
use axum::extract::FromRequest;
use axum::extract::Multipart;
use axum::extract::Request;
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use crate::domain::event::models::EventInput;
use crate::domain::event::models::ImageUpload;

const IMAGE_FIELD: &str = "image";

#[derive(Debug, Default)]
pub struct EventForm {
    pub input: EventInput,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventRequestBody {
    title: Option<String>,
    description: Option<String>,
    date: Option<String>,
    location: Option<String>,
    #[serde(rename = "type")]
    event_type: Option<String>,
}

impl From<EventRequestBody> for EventInput {
    fn from(body: EventRequestBody) -> Self {
        EventInput {
            title: body.title,
            description: body.description,
            date: body.date,
            location: body.location,
            event_type: body.event_type,
        }
    }
}

#[async_trait]
impl<S> FromRequest<S> for EventForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            return read_multipart(multipart).await;
        }

        let Json(body) = Json::<EventRequestBody>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        Ok(EventForm {
            input: body.into(),
            image: None,
        })
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<EventForm, ApiError> {
    let mut form = EventForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == IMAGE_FIELD {
            let file_name = field
                .file_name()
                .filter(|n| !n.is_empty())
                .map(str::to_string);
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;

            // Browsers send an empty part when no file was chosen.
            if file_name.is_some() || !data.is_empty() {
                form.image = Some(ImageUpload {
                    file_name,
                    content_type,
                    data,
                });
            }
            continue;
        }

        let slot = match name.as_str() {
            "title" => &mut form.input.title,
            "description" => &mut form.input.description,
            "date" => &mut form.input.date,
            "location" => &mut form.input.location,
            "type" => &mut form.input.event_type,
            _ => continue,
        };

        *slot = Some(
            field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?,
        );
    }

    Ok(form)
}
