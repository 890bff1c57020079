mod not_found;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

pub use not_found::not_found_handler;

/// JSON error body shared by every API handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        error: error.to_string(),
        message: Some(message.into()),
    };
    (status, Json(body)).into_response()
}

/// Opaque 500. The cause is logged, never returned.
pub fn internal_error(cause: &dyn std::fmt::Display) -> Response {
    tracing::error!("internal error: {}", cause);
    let body = ErrorBody {
        error: "Internal server error".to_string(),
        message: None,
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
