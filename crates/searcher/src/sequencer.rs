//! Request sequencing and response reconciliation state machine.
//!
//! # Mental model
//!
//! * A search session is a series of logical queries; each query issues one
//!   request per fetched page. Every request gets the next sequence number.
//! * `search()` always issues the initial page of `next_query`.
//! * `load_more()` issues the page after the last merged one, and only while
//!   the accepted query is still the one most recently requested.
//! * A response is accepted only when its sequence number is above every
//!   previously accepted one; otherwise it is discarded silently.
//! * An accepted initial page replaces the accumulated results; an accepted
//!   later page is appended.
//!
//! # Invariants
//!
//! * The accepted sequence number never decreases.
//! * Accumulated results always belong to one query snapshot and are never
//!   appended to with a non-contiguous page.
//! * Query snapshots are immutable once issued.
//! * Exactly one outcome per accepted response, none per discarded one.
//!
//! The sequencer is synchronous and performs no I/O; the caller dispatches
//! issued requests and feeds responses back, all from one serialized context.

use std::sync::Arc;

use marquee_query::{FacetRefinement, QuerySpec};
use marquee_results::{ResultAccumulator, ResultPage, SearchResults, SequenceError};

use crate::error::{SearchError, TransportError};

/// Outcome delivered to the result handler for one accepted response.
pub type SearchOutcome = Result<SearchResults, SearchError>;

/// One issued request: a sequence number, an immutable query snapshot and a page.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencedRequest {
	pub sequence: u64,
	pub query: Arc<QuerySpec>,
	pub page: usize,
}

impl SequencedRequest {
	/// True when this request starts its query rather than extending it.
	pub fn is_initial_page(&self) -> bool {
		self.page == self.query.initial_page()
	}
}

/// Why `load_more` did not issue a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMoreSkip {
	/// No results have been accepted yet.
	NothingAccepted,
	/// A newer query has been requested or accepted since the results were built.
	QueryChanged,
	/// The last merged page is the last page.
	LastPage,
	/// The next page is already in flight.
	AlreadyRequested,
}

impl LoadMoreSkip {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::NothingAccepted => "nothing_accepted",
			Self::QueryChanged => "query_changed",
			Self::LastPage => "last_page",
			Self::AlreadyRequested => "already_requested",
		}
	}
}

/// Result of a `load_more` call.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadMore {
	Issued(SequencedRequest),
	Skipped(LoadMoreSkip),
}

/// What happened to one response.
#[derive(Debug)]
pub enum Disposition {
	/// A request with an equal or higher sequence number was already accepted.
	Discarded { newest_accepted: u64 },
	/// The response was accepted; the outcome goes to the result handler.
	Accepted(SearchOutcome),
}

/// Sequencing state of one search surface.
#[derive(Debug, Default)]
pub struct SearchSequencer {
	next_query: QuerySpec,
	next_sequence: u64,
	last_issued: Option<SequencedRequest>,
	last_accepted: Option<SequencedRequest>,
	accumulated: Option<ResultAccumulator>,
}

impl SearchSequencer {
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts from `query` as the pending query.
	pub fn with_query(query: QuerySpec) -> Self {
		Self {
			next_query: query,
			..Self::default()
		}
	}

	/// Query the next `search()` will snapshot.
	pub fn next_query(&self) -> &QuerySpec {
		&self.next_query
	}

	/// Mutable access to the pending query. Has no effect until `search()`.
	pub fn next_query_mut(&mut self) -> &mut QuerySpec {
		&mut self.next_query
	}

	pub fn last_issued(&self) -> Option<&SequencedRequest> {
		self.last_issued.as_ref()
	}

	pub fn last_accepted(&self) -> Option<&SequencedRequest> {
		self.last_accepted.as_ref()
	}

	pub fn accumulated(&self) -> Option<&ResultAccumulator> {
		self.accumulated.as_ref()
	}

	/// Snapshots `next_query` and issues its initial page.
	pub fn search(&mut self) -> SequencedRequest {
		let query = Arc::new(self.next_query.clone());
		let page = query.initial_page();
		self.issue(query, page)
	}

	/// Issues the page after the last merged one, unless a guard applies.
	pub fn load_more(&mut self) -> LoadMore {
		let (Some(accumulated), Some(accepted), Some(issued)) = (&self.accumulated, &self.last_accepted, &self.last_issued) else {
			return LoadMore::Skipped(LoadMoreSkip::NothingAccepted);
		};

		if !issued.query.same_intent(&accepted.query) || !accepted.query.same_intent(accumulated.query()) {
			return LoadMore::Skipped(LoadMoreSkip::QueryChanged);
		}

		let next_page = accumulated.last_merged_page() + 1;
		if next_page >= accumulated.total_pages() {
			return LoadMore::Skipped(LoadMoreSkip::LastPage);
		}
		// A resolved request for the page (accepted as an error) may be retried.
		if issued.page >= next_page && issued.sequence > accepted.sequence {
			return LoadMore::Skipped(LoadMoreSkip::AlreadyRequested);
		}

		let query = Arc::clone(accumulated.query());
		LoadMore::Issued(self.issue(query, next_page))
	}

	fn issue(&mut self, query: Arc<QuerySpec>, page: usize) -> SequencedRequest {
		self.next_sequence += 1;
		let request = SequencedRequest {
			sequence: self.next_sequence,
			query,
			page,
		};
		self.last_issued = Some(request.clone());
		request
	}

	/// Reconciles the response to `request`.
	pub fn apply_response(&mut self, request: &SequencedRequest, response: Result<ResultPage, TransportError>) -> Disposition {
		if let Some(accepted) = &self.last_accepted
			&& request.sequence <= accepted.sequence
		{
			return Disposition::Discarded {
				newest_accepted: accepted.sequence,
			};
		}

		self.last_accepted = Some(request.clone());
		let outcome = match response {
			Ok(page) => self.merge(request, page),
			Err(error) => Err(error.into()),
		};
		Disposition::Accepted(outcome)
	}

	fn merge(&mut self, request: &SequencedRequest, page: ResultPage) -> SearchOutcome {
		if page.page != request.page {
			return Err(marquee_results::InvalidResponseError::new(format!("requested page {} but received page {}", request.page, page.page)).into());
		}

		let is_initial_page = request.is_initial_page();
		let accumulated = if is_initial_page {
			self.accumulated.insert(ResultAccumulator::new(page, Arc::clone(&request.query)))
		} else {
			// `load_more` always reuses the accumulated query; a foreign one means
			// the request was not issued by this sequencer.
			match &mut self.accumulated {
				Some(accumulated) if accumulated.query().same_intent(&request.query) => {
					accumulated.append(page)?;
					accumulated
				}
				_ => return Err(SequenceError::QueryMismatch { page: page.page }.into()),
			}
		};
		Ok(accumulated.snapshot(request.sequence, is_initial_page))
	}

	/// Toggles `(name, value)` in the pending query, judged against the accepted query.
	///
	/// Presence is read from the most recently accepted query snapshot (the
	/// state the user is looking at), not from `next_query`, which may already
	/// carry unconfirmed toggles. Removing an absent refinement is a no-op.
	/// Returns true when the toggle meant "add".
	pub fn toggle_facet_refinement(&mut self, name: &str, value: &str) -> bool {
		let reference = self.last_accepted.as_ref().map_or(&self.next_query, |accepted| accepted.query.as_ref());
		let present = reference.filters.has_refinement(name, value);
		let disjunctive = reference.filters.is_disjunctive(name);

		if present {
			self.next_query.filters.remove_refinement(name, value);
			false
		} else {
			self.next_query.filters.add_refinement(FacetRefinement::new(name, value), disjunctive);
			true
		}
	}
}

#[cfg(test)]
mod tests;
