use clap::Args;

use gallery_daemon::service_config::ConfigError;
use gallery_daemon::state::{AppState, StateError};
use gallery_daemon::{spawn_service, ServiceConfig, ServiceError};

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Override API server port (default from config)
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<std::path::PathBuf>,

    /// Run against an in-memory database and temporary uploads directory
    #[arg(long)]
    pub ephemeral: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("state error: {0}")]
    StateError(#[from] StateError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("service error: {0}")]
    Service(#[from] ServiceError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut config = if self.ephemeral {
            ServiceConfig::ephemeral()
        } else {
            let state = AppState::load(ctx.config_path.clone())?;
            ServiceConfig::from_app_state(&state)?
        };

        if let Some(port) = self.api_port {
            config.api_port = port;
        }
        config.log_dir = self.log_dir.clone();

        spawn_service(&config).await?;
        Ok("daemon stopped".to_string())
    }
}
