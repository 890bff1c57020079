use axum::extract::{Json, Query, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::catalog::{CatalogError, CatalogProvider, ImageFilter, ImageView};

use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::http_server::auth::Authenticated;
use crate::http_server::handlers::internal_error;
use crate::ServiceState;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substring: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl From<&ImageFilter> for ListRequest {
    fn from(filter: &ImageFilter) -> Self {
        Self {
            substring: filter.substring.clone(),
            owner: filter.owner.clone(),
        }
    }
}

pub async fn handler(
    State(state): State<ServiceState>,
    Authenticated(identity): Authenticated,
    Query(req): Query<ListRequest>,
) -> Result<impl IntoResponse, ListError> {
    let filter = ImageFilter::new(req.substring.as_deref(), req.owner.as_deref());
    let views = state.database().list(&filter).await?;

    tracing::debug!(
        caller = %identity,
        substring = ?filter.substring,
        owner = ?filter.owner,
        count = views.len(),
        "listed images"
    );
    Ok(Json(views))
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError<sqlx::Error>),
}

impl IntoResponse for ListError {
    fn into_response(self) -> Response {
        internal_error(&self)
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for ListRequest {
    type Response = Vec<ImageView>;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/images")?;
        Ok(client.get(full_url).query(&self))
    }
}
