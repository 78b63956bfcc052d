//! Typed observation stream of a searcher.

use std::time::Duration;

use crate::sequencer::LoadMoreSkip;

/// Emitted on the broadcast channel returned by [`crate::Searcher::subscribe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearcherEvent {
	/// A request was handed to the transport.
	RequestIssued { sequence: u64, page: usize },
	/// `load_more` was called but issued nothing.
	LoadMoreSkipped { reason: LoadMoreSkip },
	/// An accepted response produced results.
	ResultsAccepted { sequence: u64, page: usize, total_hits: usize },
	/// An accepted response produced an error.
	ErrorAccepted { sequence: u64, message: String },
	/// A stale response was dropped.
	ResponseDiscarded { sequence: u64, newest_accepted: u64 },
	/// A request is still pending after the slow-request threshold.
	RequestSlow { sequence: u64, page: usize, elapsed: Duration },
}
