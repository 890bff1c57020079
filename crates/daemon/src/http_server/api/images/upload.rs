use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{multipart, Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::catalog::MAX_NAME_CHARS;
use common::prelude::{CatalogError, CatalogProvider, ImageName, NameError};

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::auth::Authenticated;
use crate::http_server::handlers::{error_response, internal_error};
use crate::uploads::{UploadError, UploadStore};
use crate::ServiceState;

/// Multipart field carrying the image bytes
pub const IMAGE_FIELD: &str = "image";
/// Multipart field carrying the display name
pub const NAME_FIELD: &str = "name";

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub name: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub id: String,
    pub src: String,
}

struct ImagePart {
    content_type: Option<String>,
    bytes: Vec<u8>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Authenticated(identity): Authenticated,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, UploadHandlerError> {
    let mut image: Option<ImagePart> = None;
    let mut name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::debug!("multipart parsing error: {}", e);
        UploadHandlerError::Multipart(e.body_text())
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            IMAGE_FIELD => {
                if image.is_some() {
                    return Err(UploadHandlerError::Multipart(
                        "exactly one image part is allowed".into(),
                    ));
                }
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| UploadHandlerError::Multipart(e.body_text()))?
                    .to_vec();
                image = Some(ImagePart {
                    content_type,
                    bytes,
                });
            }
            NAME_FIELD => {
                name = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| UploadHandlerError::Multipart(e.body_text()))?,
                );
            }
            _ => {
                tracing::debug!("ignoring unknown field: {}", field_name);
            }
        }
    }

    let image = image.ok_or(UploadHandlerError::MissingFile)?;
    let content_type = image.content_type.unwrap_or_default();
    UploadStore::extension_for(&content_type)?;
    let name = ImageName::parse(name.unwrap_or_default())?;

    let stored = state.uploads().store(&content_type, &image.bytes).await?;

    let record = match state
        .database()
        .create(&name, identity.username(), &stored.src)
        .await
    {
        Ok(record) => record,
        Err(e) => {
            state.uploads().discard(&stored).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        image = %record.id,
        owner = %identity,
        src = %record.src,
        "uploaded image"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Image uploaded successfully".to_string(),
            id: record.id.to_string(),
            src: record.src,
        }),
    ))
}

#[derive(Debug, thiserror::Error)]
pub enum UploadHandlerError {
    #[error("Multipart error: {0}")]
    Multipart(String),
    #[error("no image part in request")]
    MissingFile,
    #[error("invalid name: {0}")]
    Name(#[from] NameError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Catalog(#[from] CatalogError<sqlx::Error>),
}

impl IntoResponse for UploadHandlerError {
    fn into_response(self) -> Response {
        match self {
            UploadHandlerError::Multipart(msg) => {
                error_response(StatusCode::BAD_REQUEST, "Bad request", msg)
            }
            UploadHandlerError::MissingFile => error_response(
                StatusCode::BAD_REQUEST,
                "Bad request",
                "No image file provided",
            ),
            UploadHandlerError::Name(NameError::Empty) => error_response(
                StatusCode::BAD_REQUEST,
                "Bad request",
                "Image name is required",
            ),
            UploadHandlerError::Name(NameError::TooLong(_)) => error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Unprocessable entity",
                format!("Image name must be at most {} characters", MAX_NAME_CHARS),
            ),
            UploadHandlerError::Upload(UploadError::UnsupportedType(_)) => error_response(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Unsupported media type",
                "Only PNG and JPEG images are accepted",
            ),
            UploadHandlerError::Upload(e @ (UploadError::TooLarge { .. } | UploadError::Empty)) => {
                error_response(StatusCode::BAD_REQUEST, "Bad request", e.to_string())
            }
            UploadHandlerError::Upload(e @ UploadError::Io(_)) => internal_error(&e),
            UploadHandlerError::Catalog(e) => internal_error(&e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for UploadRequest {
    type Response = UploadResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/images")?;
        let part = multipart::Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.content_type)?;
        let form = multipart::Form::new()
            .text(NAME_FIELD, self.name)
            .part(IMAGE_FIELD, part);
        Ok(client.post(full_url).multipart(form))
    }
}
