use clap::Args;

use gallery_daemon::http_server::api::client::ApiError;
use gallery_daemon::http_server::auth::{LoginRequest, RegisterRequest, TokenResponse};
use gallery_daemon::state::{AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Register {
    /// Username to register
    #[arg(long)]
    pub username: String,

    /// Password for the new account
    #[arg(long)]
    pub password: String,

    /// Contact email shown next to your images
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct Login {
    /// Username to log in as
    #[arg(long)]
    pub username: String,

    /// Account password
    #[arg(long)]
    pub password: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("failed to save session: {0}")]
    State(#[from] StateError),
}

/// Persist the token when an app directory exists; otherwise just print it
fn save_session(
    ctx: &crate::cli::op::OpContext,
    username: &str,
    response: TokenResponse,
) -> Result<String, SessionError> {
    match AppState::load(ctx.config_path.clone()) {
        Ok(state) => {
            state.save_session(&response.token)?;
            Ok(format!(
                "Logged in as {} (session saved to {})",
                username,
                state.session_path.display()
            ))
        }
        Err(StateError::NotInitialized) => Ok(response.token),
        Err(e) => Err(e.into()),
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Register {
    type Error = SessionError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let request = RegisterRequest {
            username: Some(self.username.clone()),
            password: Some(self.password.clone()),
            email: self.email.clone(),
        };
        let response = ctx.client.call(request).await?;
        save_session(ctx, &self.username, response)
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Login {
    type Error = SessionError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let request = LoginRequest {
            username: Some(self.username.clone()),
            password: Some(self.password.clone()),
        };
        let response = ctx.client.call(request).await?;
        save_session(ctx, &self.username, response)
    }
}
