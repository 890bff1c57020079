use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use common::catalog::{ImageFilter, ImageView};
use common::search::SearchTransport;

use super::error::ApiError;
use super::ApiRequest;
use crate::http_server::api::images::ListRequest;

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub remote: Url,
    client: Client,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(remote: &Url) -> Result<Self, ApiError> {
        let client = Client::builder().build()?;

        Ok(Self {
            remote: remote.clone(),
            client,
            token: None,
        })
    }

    /// Attach a bearer token to every later call
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub async fn call<T: ApiRequest>(&self, request: T) -> Result<T::Response, ApiError> {
        let mut request_builder = request.build_request(&self.remote, &self.client)?;
        if let Some(token) = &self.token {
            request_builder = request_builder.bearer_auth(token);
        }
        let response = request_builder.send().await?;
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            Ok(serde_json::from_value(serde_json::Value::Null)?)
        } else if status.is_success() {
            Ok(response.json::<T::Response>().await?)
        } else {
            Err(ApiError::HttpStatus(status, response.text().await?))
        }
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.remote
    }

    /// Get the underlying HTTP client for custom requests
    pub fn http_client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl SearchTransport for ApiClient {
    type Error = ApiError;

    async fn search(&self, filter: &ImageFilter) -> Result<Vec<ImageView>, Self::Error> {
        self.call(ListRequest::from(filter)).await
    }
}
