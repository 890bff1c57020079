use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::time::Duration;
use tokio::time::timeout;

use super::data_source::*;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

fn unavailable(message: &str) -> Response {
    let msg = serde_json::json!({"status": "failure", "message": message});
    (StatusCode::SERVICE_UNAVAILABLE, Json(msg)).into_response()
}

#[tracing::instrument]
pub async fn handler(data_src: StateDataSource) -> Response {
    match timeout(HEALTH_CHECK_TIMEOUT, data_src.is_ready()).await {
        Ok(Ok(())) => {
            let msg = serde_json::json!({"status": "ok"});
            (StatusCode::OK, Json(msg)).into_response()
        }
        Ok(Err(DataSourceError::DependencyFailure)) => {
            unavailable("one or more dependencies aren't available")
        }
        Ok(Err(DataSourceError::ShuttingDown)) => unavailable("service is shutting down"),
        Err(_) => unavailable("health check timed out"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::async_trait;

    use super::*;

    use crate::http_server::health::data_source::tests::*;

    struct Stalled;

    #[async_trait]
    impl DataSource for Stalled {
        async fn is_ready(&self) -> Result<(), DataSourceError> {
            tokio::time::sleep(HEALTH_CHECK_TIMEOUT * 2).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_handler_direct() {
        let response = handler(StateDataSource::new(Arc::new(MockReadiness::Ready))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = handler(StateDataSource::new(Arc::new(
            MockReadiness::DependencyFailure,
        )))
        .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = handler(StateDataSource::new(Arc::new(MockReadiness::ShuttingDown))).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_dependency_times_out() {
        let response = handler(StateDataSource::new(Arc::new(Stalled))).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
