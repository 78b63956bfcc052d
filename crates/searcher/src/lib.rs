//! Search request sequencing and pagination.
//!
//! [`SearchSequencer`] is the synchronous state machine deciding which
//! requests to issue and which responses to accept. [`Searcher`] runs it on
//! a tokio task against a [`SearchTransport`], so that out-of-order
//! completions are reconciled in one place and result handlers only ever see
//! a monotonic stream of outcomes.

mod config;
mod debounce;
mod error;
mod events;
mod sequencer;
mod service;
mod transport;

pub use config::SearcherConfig;
pub use debounce::Debouncer;
pub use error::{SearchError, TransportError};
pub use events::SearcherEvent;
pub use sequencer::{Disposition, LoadMore, LoadMoreSkip, SearchOutcome, SearchSequencer, SequencedRequest};
pub use service::{PendingRequest, ResultHandler, Searcher, SearcherBuilder, SlowRequestHandler};
pub use transport::{SearchTransport, TransportRequest};
