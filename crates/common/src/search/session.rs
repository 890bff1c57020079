use std::fmt::Display;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, Stream, StreamExt};

use super::sequencer::{QuerySequencer, Step, Ticket};
use crate::catalog::{ImageFilter, ImageId, ImageView};

/// Anything that can answer a catalog query, usually over the network
#[async_trait]
pub trait SearchTransport: Send + Sync {
    type Error: Display + Send;

    async fn search(&self, filter: &ImageFilter) -> Result<Vec<ImageView>, Self::Error>;
}

type Fetch<'a, E> = BoxFuture<'a, (Ticket, Result<Vec<ImageView>, E>)>;

/// A live search over a [`SearchTransport`].
///
/// Terms arrive as a stream (one item per keystroke, say). Each term
/// starts a new generation and its query runs concurrently with any that
/// are still outstanding; results are applied through the
/// [`QuerySequencer`], so only the newest search is ever shown.
#[derive(Debug)]
pub struct SearchSession<T> {
    transport: T,
    owner: Option<String>,
    sequencer: QuerySequencer<Vec<ImageView>>,
}

impl<T: SearchTransport> SearchSession<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            owner: None,
            sequencer: QuerySequencer::new(),
        }
    }

    /// Restrict every query in this session to one owner
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn sequencer(&self) -> &QuerySequencer<Vec<ImageView>> {
        &self.sequencer
    }

    pub fn visible(&self) -> &[ImageView] {
        self.sequencer.visible().map(Vec::as_slice).unwrap_or_default()
    }

    /// Reflect a successful rename locally without refetching
    pub fn renamed(&mut self, id: &ImageId, name: &str) {
        self.sequencer.edit(|views| {
            for view in views.iter_mut().filter(|v| &v.id == id) {
                view.name = name.to_string();
            }
        });
    }

    /// Consume search terms until the stream ends and every outstanding
    /// query has settled. Loads the unfiltered set first if nothing is
    /// visible yet.
    pub async fn drive<S>(&mut self, terms: S) -> &[ImageView]
    where
        S: Stream<Item = String> + Unpin,
    {
        {
            let Self {
                transport,
                owner,
                sequencer,
            } = &mut *self;
            let transport = &*transport;
            let owner = owner.as_deref();

            let mut in_flight: FuturesUnordered<Fetch<'_, T::Error>> = FuturesUnordered::new();
            if sequencer.visible().is_none() {
                if let Step::Fetch(ticket) = sequencer.search("") {
                    in_flight.push(fetch(transport, owner, ticket));
                }
            }

            let mut terms = terms.fuse();
            loop {
                tokio::select! {
                    Some(term) = terms.next() => {
                        if let Step::Fetch(ticket) = sequencer.search(&term) {
                            tracing::debug!(generation = ticket.generation(), term = %term, "search issued");
                            in_flight.push(fetch(transport, owner, ticket));
                        }
                    }
                    Some((ticket, result)) = in_flight.next(), if !in_flight.is_empty() => {
                        sequencer.complete(&ticket, result);
                    }
                    else => break,
                }
            }
        }

        self.visible()
    }
}

fn fetch<'a, T: SearchTransport>(
    transport: &'a T,
    owner: Option<&str>,
    ticket: Ticket,
) -> Fetch<'a, T::Error> {
    let filter = ImageFilter::new(Some(ticket.term()), owner);
    async move {
        let result = transport.search(&filter).await;
        (ticket, result)
    }
    .boxed()
}
