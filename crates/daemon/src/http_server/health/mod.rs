use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

mod data_source;
mod readiness;
mod version;

use crate::ServiceState;

/// Liveness only proves the process answers HTTP
async fn liveness() -> StatusCode {
    StatusCode::OK
}

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/livez", get(liveness))
        .route("/readyz", get(readiness::handler))
        .route("/version", get(version::handler))
        .with_state(state)
}
