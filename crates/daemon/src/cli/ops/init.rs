use clap::Args;

use gallery_daemon::state::{AppConfig, AppState, StateError, DEFAULT_API_PORT};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// API server port
    #[arg(long, default_value_t = DEFAULT_API_PORT)]
    pub api_port: u16,

    /// Lifetime of issued tokens, in hours
    #[arg(long, default_value_t = 24)]
    pub token_ttl_hours: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            api_port: self.api_port,
            token_ttl_hours: self.token_ttl_hours,
            ..AppConfig::default()
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        Ok(format!(
            "Initialized gallery directory at: {}\n\
             - Database: {}\n\
             - Token secret: {}\n\
             - Uploads: {}\n\
             - Config: {}\n\
             - API port: {}",
            state.app_dir.display(),
            state.db_path.display(),
            state.secret_path.display(),
            state.uploads_path.display(),
            state.config_path.display(),
            state.config.api_port,
        ))
    }
}
