use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::auth::TokenError;

use super::register::TokenResponse;
use super::required;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::handlers::{error_response, internal_error};
use crate::ServiceState;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, LoginError> {
    let Json(req) = body?;
    let (Some(username), Some(password)) = (required(req.username), required(req.password))
    else {
        return Err(LoginError::MissingFields);
    };

    if !state.credentials().verify(&username, &password).await {
        tracing::debug!(username = %username, "login rejected");
        return Err(LoginError::InvalidCredentials);
    }

    let token = state.tokens().issue(&username)?;
    Ok(Json(TokenResponse { token }))
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),
    #[error("missing username or password")]
    MissingFields,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        match self {
            LoginError::Body(_) | LoginError::MissingFields => error_response(
                StatusCode::BAD_REQUEST,
                "Bad request",
                "Missing username or password",
            ),
            LoginError::InvalidCredentials => error_response(
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                "Invalid username or password",
            ),
            LoginError::Token(e) => internal_error(&e),
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for LoginRequest {
    type Response = TokenResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/auth/login")?;
        Ok(client.post(full_url).json(&self))
    }
}
