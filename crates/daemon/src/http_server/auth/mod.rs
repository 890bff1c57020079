//! Credential exchange routes and the bearer extractor that guards
//! everything under `/api`.

use axum::routing::post;
use axum::Router;

mod bearer;
pub mod login;
pub mod register;

pub use bearer::{parse_bearer, Authenticated, BearerError};
pub use login::LoginRequest;
pub use register::{RegisterRequest, TokenResponse};

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/register", post(register::handler))
        .route("/login", post(login::handler))
        .with_state(state)
}

/// Treat a blank credential field as absent
pub(crate) fn required(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}
