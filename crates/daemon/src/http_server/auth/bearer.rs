//! `Authorization: Bearer <token>` extraction.
//!
//! A request with no usable token is `401`. A request that presents
//! something but fails verification (wrong scheme, bad signature,
//! expired) is `403`.

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use common::auth::{Identity, TokenError, TokenIssuer};

use crate::http_server::handlers::error_response;

/// The verified caller of a protected route
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BearerError {
    #[error("missing bearer token")]
    Missing,
    #[error("malformed authorization header")]
    Malformed,
    #[error(transparent)]
    Invalid(#[from] TokenError),
}

impl IntoResponse for BearerError {
    fn into_response(self) -> Response {
        tracing::debug!("rejecting request: {}", self);
        match self {
            BearerError::Missing => error_response(
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                "Missing bearer token",
            ),
            BearerError::Malformed | BearerError::Invalid(_) => error_response(
                StatusCode::FORBIDDEN,
                "Forbidden",
                "Invalid or expired token",
            ),
        }
    }
}

/// Pull the token out of an Authorization header value
pub fn parse_bearer(value: &HeaderValue) -> Result<&str, BearerError> {
    let value = value.to_str().map_err(|_| BearerError::Malformed)?.trim();

    let (scheme, token) = match value.split_once(' ') {
        Some((scheme, token)) => (scheme, token.trim()),
        None => (value, ""),
    };
    if token.is_empty() {
        return Err(BearerError::Missing);
    }
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(BearerError::Malformed);
    }
    Ok(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    TokenIssuer: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = BearerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(BearerError::Missing)?;
        let token = parse_bearer(value)?;

        let identity = TokenIssuer::from_ref(state).verify(token)?;
        Ok(Authenticated(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &'static str) -> Result<String, BearerError> {
        parse_bearer(&HeaderValue::from_static(raw)).map(str::to_string)
    }

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse("Bearer abc.def.ghi"), Ok("abc.def.ghi".to_string()));
        assert_eq!(parse("bearer abc"), Ok("abc".to_string()));
        assert_eq!(parse("Bearer"), Err(BearerError::Missing));
        assert_eq!(parse("Bearer   "), Err(BearerError::Missing));
        assert_eq!(parse(""), Err(BearerError::Missing));
        assert_eq!(parse("Basic dXNlcjpwdw=="), Err(BearerError::Malformed));
    }

    #[test]
    fn test_rejection_status_codes() {
        assert_eq!(
            BearerError::Missing.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            BearerError::Malformed.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            BearerError::Invalid(TokenError::Expired)
                .into_response()
                .status(),
            StatusCode::FORBIDDEN
        );
    }
}
