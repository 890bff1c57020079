use clap::Args;

use common::search::SearchSession;

use super::format_views;

#[derive(Args, Debug, Clone)]
pub struct Search {
    /// Only search images owned by this user
    #[arg(long)]
    pub owner: Option<String>,

    /// Successive search terms, as if typed one after another. Only the
    /// last term's results are shown; an empty string clears the search.
    pub terms: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ImagesSearchError {
    #[error("search failed: {0}")]
    Failed(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Search {
    type Error = ImagesSearchError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut session = SearchSession::new(ctx.client.clone());
        if let Some(owner) = &self.owner {
            session = session.with_owner(owner.clone());
        }

        let terms = futures::stream::iter(self.terms.clone());
        let views = session.drive(terms).await.to_vec();

        if let Some(error) = session.sequencer().error() {
            return Err(ImagesSearchError::Failed(error.to_string()));
        }
        Ok(format_views(&views))
    }
}
