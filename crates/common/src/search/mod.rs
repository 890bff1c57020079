//! Client-side live search
//!
//! [`QuerySequencer`] is the pure ordering core; [`SearchSession`] wires it
//! to an async [`SearchTransport`].

mod sequencer;
mod session;

pub use sequencer::{Outcome, QuerySequencer, Step, Ticket};
pub use session::{SearchSession, SearchTransport};
