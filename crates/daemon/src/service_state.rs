use std::path::PathBuf;

use axum::extract::FromRef;
use url::Url;

use common::access::OwnershipGate;
use common::auth::{CredentialStore, PasswordError, PasswordHasher, TokenIssuer};

use super::service_config::Config;
use crate::database::{Database, DatabaseSetupError};
use crate::process::Shutdown;
use crate::uploads::{UploadError, UploadStore};

/// Main service state. Everything in here is a connection pool, a
/// shared shutdown phase, or immutable after startup, so clones are cheap.
#[derive(Clone, Debug)]
pub struct State {
    database: Database,
    credentials: CredentialStore<Database>,
    tokens: TokenIssuer,
    uploads: UploadStore,
    shutdown: Shutdown,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        // 1. Setup database
        let database = match config.sqlite_path {
            Some(ref path) => {
                if !path.exists() {
                    return Err(StateSetupError::DatabasePathDoesNotExist);
                }
                let url = Url::parse(&format!("sqlite://{}", path.display()))
                    .map_err(|_| StateSetupError::InvalidDatabaseUrl)?;
                tracing::info!("Database URL: {}", url);
                Database::connect(&url).await?
            }
            None => {
                tracing::info!("Database URL: sqlite::memory:");
                Database::in_memory().await?
            }
        };

        // 2. Setup uploads directory
        let uploads_dir = match config.uploads_dir {
            Some(ref dir) => dir.clone(),
            None => tempfile::tempdir()
                .map_err(|e| StateSetupError::Uploads(e.into()))?
                .keep(),
        };
        tracing::info!(path = %uploads_dir.display(), "Using uploads directory");
        let uploads = UploadStore::new(uploads_dir, config.max_upload_bytes).await?;

        // 3. Setup credentials and tokens
        let hasher = PasswordHasher::new(config.hash_cost)?;
        let credentials = CredentialStore::new(database.clone(), hasher);
        let tokens = TokenIssuer::new(&config.token_secret, config.token_ttl);

        Ok(Self {
            database,
            credentials,
            tokens,
            uploads,
            shutdown: Shutdown::new(),
        })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn credentials(&self) -> &CredentialStore<Database> {
        &self.credentials
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.uploads.dir().to_path_buf()
    }

    /// Lifecycle phase shared with the server task and readiness probe
    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    /// Ownership gate over the catalog
    pub fn gate(&self) -> OwnershipGate<Database> {
        OwnershipGate::new(self.database.clone())
    }
}

impl AsRef<Database> for State {
    fn as_ref(&self) -> &Database {
        self.database()
    }
}

impl FromRef<State> for Database {
    fn from_ref(state: &State) -> Self {
        state.database.clone()
    }
}

impl FromRef<State> for TokenIssuer {
    fn from_ref(state: &State) -> Self {
        state.tokens.clone()
    }
}

impl FromRef<State> for Shutdown {
    fn from_ref(state: &State) -> Self {
        state.shutdown.clone()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("Database path does not exist")]
    DatabasePathDoesNotExist,
    #[error("Database setup error")]
    DatabaseSetupError(#[from] DatabaseSetupError),
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,
    #[error("Uploads directory error: {0}")]
    Uploads(#[from] UploadError),
    #[error("Password hasher error: {0}")]
    Hasher(#[from] PasswordError),
}
