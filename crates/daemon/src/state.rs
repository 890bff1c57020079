use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};

use common::auth::{HashCost, TokenSecret};

use crate::uploads::DEFAULT_MAX_UPLOAD_BYTES;

pub const APP_NAME: &str = "gallery";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "db.sqlite";
pub const SECRET_FILE_NAME: &str = "token.secret";
pub const UPLOADS_DIR_NAME: &str = "uploads";
pub const SESSION_FILE_NAME: &str = "session.token";

pub const DEFAULT_API_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port for the API server
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Lifetime of issued tokens, in hours
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u32,
    /// Largest accepted upload, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Argon2id work factor for new credentials
    #[serde(default)]
    pub password_hash: HashCost,
}

fn default_api_port() -> u16 {
    DEFAULT_API_PORT
}

fn default_token_ttl_hours() -> u32 {
    24
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            token_ttl_hours: default_token_ttl_hours(),
            max_upload_bytes: default_max_upload_bytes(),
            password_hash: HashCost::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the app directory (~/.gallery)
    pub app_dir: PathBuf,
    /// Path to the SQLite database
    pub db_path: PathBuf,
    /// Path to the hex-encoded token signing secret
    pub secret_path: PathBuf,
    /// Path to the uploads directory
    pub uploads_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Path to the CLI's saved session token
    pub session_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the app directory path (custom or default ~/.gallery)
    pub fn app_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    fn at(app_dir: PathBuf, config: AppConfig) -> Self {
        Self {
            db_path: app_dir.join(DB_FILE_NAME),
            secret_path: app_dir.join(SECRET_FILE_NAME),
            uploads_path: app_dir.join(UPLOADS_DIR_NAME),
            config_path: app_dir.join(CONFIG_FILE_NAME),
            session_path: app_dir.join(SESSION_FILE_NAME),
            app_dir,
            config,
        }
    }

    /// Initialize a new app directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let app_dir = Self::app_dir(custom_path)?;

        if app_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&app_dir)?;
        let state = Self::at(app_dir, config.unwrap_or_default());

        fs::create_dir_all(&state.uploads_path)?;
        fs::write(&state.secret_path, TokenSecret::generate().to_hex())?;
        fs::write(&state.config_path, toml::to_string_pretty(&state.config)?)?;

        // the service runs migrations on first start
        fs::write(&state.db_path, "")?;

        Ok(state)
    }

    /// Load existing state from the app directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let app_dir = Self::app_dir(custom_path)?;

        if !app_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let state = Self::at(app_dir, AppConfig::default());
        for (path, name) in [
            (&state.db_path, DB_FILE_NAME),
            (&state.secret_path, SECRET_FILE_NAME),
            (&state.config_path, CONFIG_FILE_NAME),
        ] {
            if !path.exists() {
                return Err(StateError::MissingFile(name.to_string()));
            }
        }
        if !state.uploads_path.exists() {
            return Err(StateError::MissingFile(format!("{}/", UPLOADS_DIR_NAME)));
        }

        let config_toml = fs::read_to_string(&state.config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self { config, ..state })
    }

    /// Load the token signing secret
    pub fn load_secret(&self) -> Result<TokenSecret, StateError> {
        let hex = fs::read_to_string(&self.secret_path)?;
        TokenSecret::from_hex(&hex).map_err(|e| StateError::InvalidSecret(e.to_string()))
    }

    /// Token saved by the last `login` or `register`, if any
    pub fn load_session(&self) -> Result<Option<String>, StateError> {
        match fs::read_to_string(&self.session_path) {
            Ok(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_session(&self, token: &str) -> Result<(), StateError> {
        fs::write(&self.session_path, token)?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("gallery directory not initialized. Run 'gallery init' first")]
    NotInitialized,

    #[error("gallery directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid token secret: {0}")]
    InvalidSecret(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("gallery");

        let config = AppConfig {
            api_port: 4000,
            ..AppConfig::default()
        };
        let created = AppState::init(Some(dir.clone()), Some(config.clone())).unwrap();
        assert!(created.uploads_path.is_dir());

        let loaded = AppState::load(Some(dir.clone())).unwrap();
        assert_eq!(loaded.config, config);
        assert_eq!(
            loaded.load_secret().unwrap(),
            created.load_secret().unwrap()
        );

        assert!(matches!(
            AppState::init(Some(dir), None),
            Err(StateError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_load_requires_init() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            AppState::load(Some(tmp.path().join("missing"))),
            Err(StateError::NotInitialized)
        ));
    }

    #[test]
    fn test_session_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let state = AppState::init(Some(tmp.path().join("g")), None).unwrap();

        assert_eq!(state.load_session().unwrap(), None);
        state.save_session("abc.def.ghi").unwrap();
        assert_eq!(state.load_session().unwrap().as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = toml::from_str("api_port = 8081").unwrap();
        assert_eq!(config.api_port, 8081);
        assert_eq!(config.token_ttl_hours, 24);
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
    }
}
