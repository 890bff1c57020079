use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::auth::{CredentialError, TokenError};
use common::catalog::{CatalogError, CatalogProvider, UserEntry, DEFAULT_EMAIL};

use super::required;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::handlers::{error_response, internal_error};
use crate::ServiceState;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, RegisterError> {
    let Json(req) = body?;
    let (Some(username), Some(password)) = (required(req.username), required(req.password))
    else {
        return Err(RegisterError::MissingFields);
    };

    // Directory insert is idempotent; it goes first so a failure leaves
    // the username free to retry.
    let email = required(req.email).unwrap_or_else(|| DEFAULT_EMAIL.to_string());
    state
        .database()
        .add_user(&UserEntry::new(username.clone(), username.clone(), email))
        .await?;

    state.credentials().register(&username, &password).await?;

    let token = state.tokens().issue(&username)?;
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),
    #[error("missing username or password")]
    MissingFields,
    #[error(transparent)]
    Credential(#[from] CredentialError<sqlx::Error>),
    #[error("failed to record user: {0}")]
    Directory(#[from] CatalogError<sqlx::Error>),
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl IntoResponse for RegisterError {
    fn into_response(self) -> Response {
        match self {
            RegisterError::Body(_)
            | RegisterError::MissingFields
            | RegisterError::Credential(
                CredentialError::EmptyUsername | CredentialError::EmptyPassword,
            ) => error_response(
                StatusCode::BAD_REQUEST,
                "Bad request",
                "Missing username or password",
            ),
            RegisterError::Credential(CredentialError::Conflict(_)) => error_response(
                StatusCode::CONFLICT,
                "Username already taken",
                "A user with this username already exists",
            ),
            RegisterError::Credential(e) => internal_error(&e),
            RegisterError::Directory(e) => internal_error(&e),
            RegisterError::Token(e) => internal_error(&e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for RegisterRequest {
    type Response = TokenResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/auth/register")?;
        Ok(client.post(full_url).json(&self))
    }
}
