use clap::Args;

use gallery_daemon::http_server::api::client::ApiError;
use gallery_daemon::http_server::api::images::RenameRequest;

#[derive(Args, Debug, Clone)]
pub struct Rename {
    /// Id of the image to rename
    #[arg(long)]
    pub id: String,

    /// New display name (1-100 characters)
    #[arg(long)]
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ImagesRenameError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Rename {
    type Error = ImagesRenameError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        ctx.client
            .call(RenameRequest::new(&self.id, &self.name))
            .await?;
        Ok(format!("Renamed {} to {}", self.id, self.name))
    }
}
