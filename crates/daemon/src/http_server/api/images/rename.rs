use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::catalog::MAX_NAME_CHARS;
use common::prelude::{AccessError, ImageId, ImageName, NameError};

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::auth::Authenticated;
use crate::http_server::handlers::{error_response, internal_error};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameRequest {
    /// Image to rename; carried in the path, not the body
    #[serde(skip)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl RenameRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }
}

pub async fn handler(
    State(state): State<ServiceState>,
    Authenticated(identity): Authenticated,
    Path(id): Path<String>,
    body: Result<Json<RenameRequest>, JsonRejection>,
) -> Result<impl IntoResponse, RenameError> {
    let Json(req) = body?;
    let name = ImageName::parse(req.name.unwrap_or_default())?;
    let id = ImageId::from(id);

    state.gate().rename_as(&identity, &id, &name).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, thiserror::Error)]
pub enum RenameError {
    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),
    #[error("invalid name: {0}")]
    Name(#[from] NameError),
    #[error(transparent)]
    Access(#[from] AccessError<sqlx::Error>),
}

impl IntoResponse for RenameError {
    fn into_response(self) -> Response {
        match self {
            RenameError::Body(rejection) => error_response(
                StatusCode::BAD_REQUEST,
                "Bad request",
                rejection.body_text(),
            ),
            RenameError::Name(NameError::Empty) => error_response(
                StatusCode::BAD_REQUEST,
                "Bad request",
                "Image name must not be empty",
            ),
            RenameError::Name(NameError::TooLong(_)) => error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Unprocessable entity",
                format!("Image name must be at most {} characters", MAX_NAME_CHARS),
            ),
            RenameError::Access(AccessError::NotFound(id)) => error_response(
                StatusCode::NOT_FOUND,
                "Not found",
                format!("No image with id {}", id),
            ),
            RenameError::Access(AccessError::Forbidden { .. }) => error_response(
                StatusCode::FORBIDDEN,
                "Forbidden",
                "You can only rename your own images",
            ),
            RenameError::Access(AccessError::Provider(e)) => internal_error(&e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for RenameRequest {
    type Response = ();

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("/api/images/{}", self.id))?;
        Ok(client.put(full_url).json(&self))
    }
}
