use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;

use common::version::build_info;

#[tracing::instrument]
pub async fn handler() -> Response {
    (StatusCode::OK, Json(build_info())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reports_package_version() {
        let response = handler().await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let info: common::version::BuildInfo = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(info.package_version, env!("CARGO_PKG_VERSION"));
    }
}
