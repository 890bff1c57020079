use std::env;
use std::path::PathBuf;

use clap::Args;

use gallery_daemon::http_server::api::client::ApiError;
use gallery_daemon::http_server::api::images::UploadRequest;

#[derive(Args, Debug, Clone)]
pub struct Upload {
    /// Path to a PNG or JPEG file
    #[arg(long)]
    pub path: PathBuf,

    /// Display name (defaults to the file stem)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImagesUploadError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Upload {
    type Error = ImagesUploadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let path = if self.path.is_absolute() {
            self.path.clone()
        } else {
            env::current_dir()?.join(&self.path)
        };

        let bytes = tokio::fs::read(&path).await?;
        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .to_string();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match &self.name {
            Some(name) => name.clone(),
            None => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };

        let response = ctx
            .client
            .call(UploadRequest {
                name,
                file_name,
                content_type,
                bytes,
            })
            .await?;

        Ok(format!(
            "{} (id: {}, src: {})",
            response.message, response.id, response.src
        ))
    }
}
