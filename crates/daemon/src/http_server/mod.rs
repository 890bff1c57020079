use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse};
use tower_http::LatencyUnit;

pub mod api;
pub mod auth;
mod config;
mod handlers;
mod health;

pub use config::Config;
pub use handlers::ErrorBody;

use crate::process::Shutdown;
use crate::uploads::UPLOADS_ROUTE;
use crate::ServiceState;

const API_PREFIX: &str = "/api";
const AUTH_PREFIX: &str = "/auth";
const STATUS_PREFIX: &str = "/_status";

/// Full route table: health probes, credential exchange, the image API
/// and read-only access to stored uploads.
pub fn router(config: &Config, state: ServiceState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(config.log_level)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    Router::new()
        .nest(STATUS_PREFIX, health::router(state.clone()))
        .nest(AUTH_PREFIX, auth::router(state.clone()))
        .nest(API_PREFIX, api::router(state.clone()))
        .nest_service(UPLOADS_ROUTE, ServeDir::new(state.uploads_dir()))
        .fallback(handlers::not_found_handler)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .with_state(state)
        .layer(trace_layer)
}

/// Run the HTTP server until `shutdown` reaches the stopping phase
pub async fn run_api(
    config: Config,
    state: ServiceState,
    shutdown: Shutdown,
) -> Result<(), HttpServerError> {
    let listen_addr = config.listen_addr;
    let router = router(&config, state);

    tracing::info!(addr = ?listen_addr, "API server listening");
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.stopped().await })
        .await?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(#[from] std::io::Error),
}
