use std::fmt::Display;

/// A query issued under a particular generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    term: String,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Trimmed search term; empty means unfiltered
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_unfiltered(&self) -> bool {
        self.term.is_empty()
    }
}

/// What the caller has to do after starting a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Run the query and hand the result to [`QuerySequencer::complete`]
    Fetch(Ticket),
    /// Served from the unfiltered cache; nothing to fetch
    Cached,
}

/// What happened to a completed result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Superseded by a newer search; discarded
    Stale,
}

/// Orders concurrent search results by generation.
///
/// Every new search bumps the generation, and only a result carrying the
/// current generation may touch visible state. Older results are dropped
/// on arrival. In-flight work is never cancelled, only ignored.
///
/// The last unfiltered result set is cached so that clearing the search
/// restores it without a round trip.
#[derive(Debug, Clone)]
pub struct QuerySequencer<R> {
    generation: u64,
    visible: Option<R>,
    unfiltered: Option<R>,
    loading: bool,
    error: Option<String>,
}

impl<R> Default for QuerySequencer<R> {
    fn default() -> Self {
        Self {
            generation: 0,
            visible: None,
            unfiltered: None,
            loading: false,
            error: None,
        }
    }
}

impl<R: Clone> QuerySequencer<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a search for `term`. Always opens a new generation.
    pub fn search(&mut self, term: &str) -> Step {
        let term = term.trim();
        self.generation += 1;
        self.error = None;

        if term.is_empty() {
            if let Some(cached) = &self.unfiltered {
                self.visible = Some(cached.clone());
                self.loading = false;
                return Step::Cached;
            }
        }

        self.loading = true;
        Step::Fetch(Ticket {
            generation: self.generation,
            term: term.to_string(),
        })
    }

    /// Start an unfiltered fetch even when a cached set exists
    pub fn refresh(&mut self) -> Ticket {
        self.generation += 1;
        self.error = None;
        self.loading = true;
        Ticket {
            generation: self.generation,
            term: String::new(),
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.generation
    }

    /// Deliver the result for a ticket.
    ///
    /// A failure on the current generation sets the error flag and leaves
    /// the visible set alone. Nothing is retried.
    pub fn complete<E: Display>(&mut self, ticket: &Ticket, result: Result<R, E>) -> Outcome {
        if !self.is_current(ticket) {
            tracing::trace!(
                generation = ticket.generation,
                current = self.generation,
                "discarding stale search result"
            );
            return Outcome::Stale;
        }

        self.loading = false;
        match result {
            Ok(results) => {
                if ticket.is_unfiltered() {
                    self.unfiltered = Some(results.clone());
                }
                self.visible = Some(results);
            }
            Err(e) => {
                tracing::warn!(term = %ticket.term, "search failed: {}", e);
                self.error = Some(e.to_string());
            }
        }
        Outcome::Applied
    }

    /// Apply a local change to the visible set and the unfiltered cache,
    /// e.g. after a successful rename
    pub fn edit(&mut self, mut f: impl FnMut(&mut R)) {
        if let Some(visible) = self.visible.as_mut() {
            f(visible);
        }
        if let Some(cached) = self.unfiltered.as_mut() {
            f(cached);
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn visible(&self) -> Option<&R> {
        self.visible.as_ref()
    }

    pub fn cached(&self) -> Option<&R> {
        self.unfiltered.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Seq = QuerySequencer<Vec<&'static str>>;

    fn ticket(step: Step) -> Ticket {
        match step {
            Step::Fetch(ticket) => ticket,
            Step::Cached => panic!("expected a fetch"),
        }
    }

    #[test]
    fn test_out_of_order_results() {
        let mut seq = Seq::new();
        let first = ticket(seq.search("a"));
        let second = ticket(seq.search("ab"));

        assert_eq!(
            seq.complete::<String>(&second, Ok(vec!["abc"])),
            Outcome::Applied
        );
        assert_eq!(
            seq.complete::<String>(&first, Ok(vec!["abc", "apple"])),
            Outcome::Stale
        );
        assert_eq!(seq.visible(), Some(&vec!["abc"]));
        assert!(!seq.is_loading());
    }

    #[test]
    fn test_generation_increments_on_every_search() {
        let mut seq = Seq::new();
        ticket(seq.search(""));
        ticket(seq.search("x"));
        ticket(seq.search("x"));
        assert_eq!(seq.generation(), 3);
    }

    #[test]
    fn test_clear_uses_cache() {
        let mut seq = Seq::new();
        let load = ticket(seq.search(""));
        seq.complete::<String>(&load, Ok(vec!["a", "b"]));

        let filtered = ticket(seq.search("a"));
        seq.complete::<String>(&filtered, Ok(vec!["a"]));

        assert_eq!(seq.search("  "), Step::Cached);
        assert_eq!(seq.visible(), Some(&vec!["a", "b"]));
        // the earlier filtered ticket is now stale too
        assert_eq!(
            seq.complete::<String>(&filtered, Ok(vec!["a"])),
            Outcome::Stale
        );
    }

    #[test]
    fn test_clear_without_cache_fetches() {
        let mut seq = Seq::new();
        let t = ticket(seq.search(""));
        assert!(t.is_unfiltered());
        seq.complete(&t, Err("offline"));
        assert!(matches!(seq.search(""), Step::Fetch(_)));
    }

    #[test]
    fn test_filtered_results_never_cached() {
        let mut seq = Seq::new();
        let t = ticket(seq.search("cat"));
        seq.complete::<String>(&t, Ok(vec!["cat"]));
        assert_eq!(seq.cached(), None);
    }

    #[test]
    fn test_error_keeps_visible_set() {
        let mut seq = Seq::new();
        let load = ticket(seq.search(""));
        seq.complete::<String>(&load, Ok(vec!["a"]));

        let t = ticket(seq.search("b"));
        assert_eq!(seq.complete(&t, Err("boom")), Outcome::Applied);
        assert_eq!(seq.error(), Some("boom"));
        assert_eq!(seq.visible(), Some(&vec!["a"]));

        // next search starts clean
        ticket(seq.search("c"));
        assert_eq!(seq.error(), None);
    }

    #[test]
    fn test_stale_error_ignored() {
        let mut seq = Seq::new();
        let old = ticket(seq.search("a"));
        let _new = ticket(seq.search("b"));
        assert_eq!(seq.complete(&old, Err("boom")), Outcome::Stale);
        assert_eq!(seq.error(), None);
        assert!(seq.is_loading());
    }

    #[test]
    fn test_refresh_bypasses_cache() {
        let mut seq = Seq::new();
        let load = ticket(seq.search(""));
        seq.complete::<String>(&load, Ok(vec!["a"]));

        let t = seq.refresh();
        seq.complete::<String>(&t, Ok(vec!["a", "b"]));
        assert_eq!(seq.cached(), Some(&vec!["a", "b"]));
    }

    #[test]
    fn test_edit_patches_visible_and_cache() {
        let mut seq = Seq::new();
        let load = ticket(seq.search(""));
        seq.complete::<String>(&load, Ok(vec!["old"]));

        seq.edit(|items| items[0] = "new");
        assert_eq!(seq.visible(), Some(&vec!["new"]));
        assert_eq!(seq.cached(), Some(&vec!["new"]));
    }
}
