use clap::{Args, Subcommand};

pub mod ls;
pub mod rename;
pub mod search;
pub mod upload;

use crate::cli::op::Op;

crate::command_enum! {
    (Ls, ls::Ls),
    (Rename, rename::Rename),
    (Upload, upload::Upload),
    (Search, search::Search),
}

// Rename the generated Command to ImagesCommand for clarity
pub type ImagesCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Images {
    #[command(subcommand)]
    pub command: ImagesCommand,
}

#[async_trait::async_trait]
impl Op for Images {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

/// One line per image: id, name, author and where the file is served
pub(crate) fn format_views(views: &[common::catalog::ImageView]) -> String {
    if views.is_empty() {
        return "No images found".to_string();
    }
    views
        .iter()
        .map(|view| {
            format!(
                "{}  {}  by {} <{}>  {}",
                view.id, view.name, view.author.username, view.author.email, view.src
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
