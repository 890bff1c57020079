//! Daemon lifecycle: one API task bound to a shared [`Shutdown`] phase.

mod logging;
mod shutdown;

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};
use tokio::time::timeout;

pub use logging::{init_logging, LogGuard, LOG_FILE_PREFIX};
pub use shutdown::{Phase, Shutdown, DRAIN_PERIOD};

use crate::http_server::{self, HttpServerError};
use crate::service_state::StateSetupError;
use crate::{ServiceConfig, ServiceState};

/// Upper bound on open connections finishing once stopping begins
const STOP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to set up service state: {0}")]
    Setup(#[from] StateSetupError),
    #[error(transparent)]
    Http(#[from] HttpServerError),
    #[error("API task failed: {0}")]
    Task(#[from] JoinError),
    #[error("connections still open {}s after stop", .0.as_secs())]
    StopTimeout(Duration),
}

/// A running API server. Dropping it leaves the server running.
pub struct ServiceHandle {
    api: JoinHandle<Result<(), HttpServerError>>,
    signals: JoinHandle<()>,
    shutdown: Shutdown,
}

impl ServiceHandle {
    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    /// Resolve when the server exits, either on its own (bind or serve
    /// failure) or after the shutdown phase reaches stopping.
    pub async fn wait(mut self) -> Result<(), ServiceError> {
        let finished = tokio::select! {
            result = &mut self.api => Some(result),
            _ = self.shutdown.stopped() => None,
        };
        self.signals.abort();

        let result = match finished {
            Some(result) => {
                self.shutdown.stop();
                result
            }
            None => timeout(STOP_TIMEOUT, self.api)
                .await
                .map_err(|_| ServiceError::StopTimeout(STOP_TIMEOUT))?,
        };
        result??;
        tracing::info!("API server stopped");
        Ok(())
    }
}

/// Build state from `config` and start serving on `api_port`.
pub async fn start_service(
    config: &ServiceConfig,
) -> Result<(ServiceState, ServiceHandle), ServiceError> {
    let state = ServiceState::from_config(config).await?;
    let shutdown = state.shutdown().clone();

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.api_port));
    let http_config = http_server::Config::new(addr, config.max_upload_bytes);
    let api = tokio::spawn(http_server::run_api(
        http_config,
        state.clone(),
        shutdown.clone(),
    ));
    let signals = shutdown.listen_for_signals();

    tracing::info!(port = config.api_port, "API server started");
    Ok((
        state,
        ServiceHandle {
            api,
            signals,
            shutdown,
        },
    ))
}

/// Install logging, serve, and block until shutdown completes.
pub async fn spawn_service(config: &ServiceConfig) -> Result<(), ServiceError> {
    let _logs = init_logging(config);
    let (_, handle) = start_service(config).await?;
    let result = handle.wait().await;
    if let Err(e) = &result {
        tracing::error!("service exited with error: {}", e);
    }
    result
}

#[cfg(test)]
mod tests {
    use common::auth::HashCost;

    use super::*;

    fn config() -> ServiceConfig {
        let mut config = ServiceConfig::ephemeral();
        config.api_port = 0;
        config.hash_cost = HashCost::minimal();
        config
    }

    #[tokio::test]
    async fn test_programmatic_stop_ends_service() {
        let (state, handle) = start_service(&config()).await.unwrap();
        assert!(!state.shutdown().is_shutting_down());

        handle.shutdown().stop();
        handle.wait().await.unwrap();
        assert_eq!(state.shutdown().phase(), Phase::Stopping);
    }

    #[tokio::test]
    async fn test_bind_failure_surfaces_from_wait() {
        let taken = std::net::TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0)).unwrap();
        let mut config = config();
        config.api_port = taken.local_addr().unwrap().port();

        let (state, handle) = start_service(&config).await.unwrap();
        let err = handle.wait().await.unwrap_err();
        assert!(matches!(err, ServiceError::Http(_)));
        assert!(state.shutdown().is_shutting_down());
    }
}
