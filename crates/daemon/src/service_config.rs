use std::path::PathBuf;

use common::auth::{HashCost, TokenSecret};

use crate::state::{AppState, DEFAULT_API_PORT};
use crate::uploads::DEFAULT_MAX_UPLOAD_BYTES;

/// Environment variable that overrides the on-disk signing secret (hex)
pub const TOKEN_SECRET_ENV: &str = "GALLERY_TOKEN_SECRET";

#[derive(Debug)]
pub struct Config {
    // http server configuration
    /// Port for the API HTTP server
    pub api_port: u16,

    // data store configuration
    /// a path to a sqlite database, if not set then an
    ///  in-memory database will be used
    pub sqlite_path: Option<PathBuf>,
    /// Directory uploaded files are written to, if not set
    ///  then a temporary directory will be used
    pub uploads_dir: Option<PathBuf>,
    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,

    // auth configuration
    /// Process-wide token signing secret
    pub token_secret: TokenSecret,
    /// Lifetime of issued tokens
    pub token_ttl: time::Duration,
    /// Work factor for new password hashes
    pub hash_cost: HashCost,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Ephemeral configuration: in-memory database, temporary uploads,
    ///  and a freshly generated secret
    pub fn ephemeral() -> Self {
        Self {
            api_port: DEFAULT_API_PORT,
            sqlite_path: None,
            uploads_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            token_secret: TokenSecret::generate(),
            token_ttl: common::auth::DEFAULT_TOKEN_TTL,
            hash_cost: HashCost::default(),
            log_level: tracing::Level::INFO,
            log_dir: None,
        }
    }

    /// Build the service configuration from an initialized app directory.
    ///
    /// The signing secret comes from [`TOKEN_SECRET_ENV`] when set, otherwise
    ///  from the secret file written at init.
    pub fn from_app_state(state: &AppState) -> Result<Self, ConfigError> {
        let token_secret = match std::env::var(TOKEN_SECRET_ENV) {
            Ok(hex) => TokenSecret::from_hex(&hex).map_err(|e| {
                ConfigError::InvalidSecret(TOKEN_SECRET_ENV.to_string(), e.to_string())
            })?,
            Err(_) => state.load_secret().map_err(|e| {
                ConfigError::InvalidSecret(
                    state.secret_path.display().to_string(),
                    e.to_string(),
                )
            })?,
        };

        Ok(Self {
            api_port: state.config.api_port,
            sqlite_path: Some(state.db_path.clone()),
            uploads_dir: Some(state.uploads_path.clone()),
            max_upload_bytes: state.config.max_upload_bytes,
            token_secret,
            token_ttl: time::Duration::hours(state.config.token_ttl_hours.into()),
            hash_cost: state.config.password_hash,
            log_level: tracing::Level::DEBUG,
            log_dir: None,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid token secret from {0}: {1}")]
    InvalidSecret(String, String),
}
