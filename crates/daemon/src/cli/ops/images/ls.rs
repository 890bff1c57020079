use clap::Args;

use gallery_daemon::http_server::api::client::ApiError;
use gallery_daemon::http_server::api::images::ListRequest;

use super::format_views;

#[derive(Args, Debug, Clone)]
pub struct Ls {
    /// Only images whose name contains this text (case-insensitive)
    #[arg(long)]
    pub substring: Option<String>,

    /// Only images owned by this user
    #[arg(long)]
    pub owner: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImagesLsError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Ls {
    type Error = ImagesLsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let request = ListRequest {
            substring: self.substring.clone(),
            owner: self.owner.clone(),
        };
        let views = ctx.client.call(request).await?;
        Ok(format_views(&views))
    }
}
