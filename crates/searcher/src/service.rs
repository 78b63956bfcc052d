//! Searcher actor: serialises every search operation onto one task.
//!
//! # Purpose
//!
//! * Owns a [`SearchSequencer`] and drives it from a single command queue.
//! * Dispatches issued requests to a [`SearchTransport`] concurrently.
//! * Publishes the latest reconciled results and pending requests as snapshots.
//!
//! # Mental model
//!
//! * [`Searcher`] is a cheap command handle; the actor owns authoritative state.
//! * Handle calls and transport completions share one ingress queue, so
//!   sequencing decisions never race with response handling.
//! * Transport calls run on their own tasks and report back as commands;
//!   completion order is arbitrary and the sequencer filters stale ones.
//!
//! # Invariants
//!
//! * Must invoke the result handler exactly once per accepted response.
//! * Must never invoke the result handler for a discarded response.
//! * Must remove a request from the pending set when its response arrives,
//!   accepted or not. A panicking transport call answers with
//!   [`TransportError::Unavailable`].
//! * Must publish snapshots after every command.
//!
//! # Lifecycle
//!
//! * Create with [`Searcher::builder`] and [`SearcherBuilder::spawn`] inside a tokio runtime.
//! * Call `shutdown` for an awaited stop; dropping the handle cancels the actor
//!   and every in-flight transport call.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use marquee_query::QuerySpec;
use marquee_results::{ResultPage, SearchResults};
use parking_lot::RwLock;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::SearcherConfig;
use crate::error::TransportError;
use crate::events::SearcherEvent;
use crate::sequencer::{Disposition, LoadMore, SearchOutcome, SearchSequencer, SequencedRequest};
use crate::transport::{SearchTransport, TransportRequest};

/// Receives one outcome per accepted response, on the actor task.
pub type ResultHandler = Arc<dyn Fn(SearchOutcome) + Send + Sync>;

/// Receives requests that outlive the slow-request threshold.
pub type SlowRequestHandler = Arc<dyn Fn(&PendingRequest) + Send + Sync>;

/// An issued request whose response has not arrived yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
	pub sequence: u64,
	pub page: usize,
	pub issued_at: Instant,
}

type QueryEdit = Box<dyn FnOnce(&mut QuerySpec) + Send>;

enum SearcherCmd {
	UpdateQuery(QueryEdit),
	ToggleFacetRefinement {
		name: String,
		value: String,
	},
	SetFacetMode {
		name: String,
		disjunctive: bool,
	},
	Search,
	LoadMore,
	Response {
		request: SequencedRequest,
		response: Result<ResultPage, TransportError>,
	},
	SlowCheck {
		sequence: u64,
	},
	Flush(oneshot::Sender<()>),
}

impl fmt::Debug for SearcherCmd {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::UpdateQuery(_) => f.write_str("UpdateQuery"),
			Self::ToggleFacetRefinement { name, value } => f.debug_struct("ToggleFacetRefinement").field("name", name).field("value", value).finish(),
			Self::SetFacetMode { name, disjunctive } => f.debug_struct("SetFacetMode").field("name", name).field("disjunctive", disjunctive).finish(),
			Self::Search => f.write_str("Search"),
			Self::LoadMore => f.write_str("LoadMore"),
			Self::Response { request, response } => f
				.debug_struct("Response")
				.field("sequence", &request.sequence)
				.field("page", &request.page)
				.field("ok", &response.is_ok())
				.finish(),
			Self::SlowCheck { sequence } => f.debug_struct("SlowCheck").field("sequence", sequence).finish(),
			Self::Flush(_) => f.write_str("Flush"),
		}
	}
}

#[derive(Default)]
struct SearcherShared {
	next_query: Arc<QuerySpec>,
	results: Option<SearchResults>,
	last_issued: Option<u64>,
	last_accepted: Option<u64>,
	pending: Arc<[PendingRequest]>,
}

struct SearcherActor<T> {
	sequencer: SearchSequencer,
	transport: Arc<T>,
	config: SearcherConfig,
	pending: BTreeMap<u64, PendingRequest>,
	results: Option<SearchResults>,
	on_result: ResultHandler,
	on_slow_request: Option<SlowRequestHandler>,
	events: broadcast::Sender<SearcherEvent>,
	shared: Arc<RwLock<SearcherShared>>,
	cmd_tx: mpsc::UnboundedSender<SearcherCmd>,
	cancel: CancellationToken,
}

impl<T: SearchTransport> SearcherActor<T> {
	async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<SearcherCmd>) {
		let cancel = self.cancel.clone();
		loop {
			tokio::select! {
				biased;
				() = cancel.cancelled() => break,
				maybe_cmd = cmd_rx.recv() => match maybe_cmd {
					Some(cmd) => self.handle(cmd),
					None => break,
				},
			}
		}
		tracing::debug!(pending = self.pending.len(), "searcher stopped");
	}

	fn handle(&mut self, cmd: SearcherCmd) {
		match cmd {
			SearcherCmd::UpdateQuery(edit) => edit(self.sequencer.next_query_mut()),
			SearcherCmd::ToggleFacetRefinement { name, value } => {
				let added = self.sequencer.toggle_facet_refinement(&name, &value);
				tracing::trace!(facet = %name, value = %value, added, "facet refinement toggled");
			}
			SearcherCmd::SetFacetMode { name, disjunctive } => {
				self.sequencer.next_query_mut().set_facet_mode(&name, disjunctive);
			}
			SearcherCmd::Search => {
				let request = self.sequencer.search();
				self.dispatch(request);
			}
			SearcherCmd::LoadMore => match self.sequencer.load_more() {
				LoadMore::Issued(request) => self.dispatch(request),
				LoadMore::Skipped(reason) => {
					tracing::trace!(reason = reason.as_str(), "load_more skipped");
					let _ = self.events.send(SearcherEvent::LoadMoreSkipped { reason });
				}
			},
			SearcherCmd::Response { request, response } => self.apply_response(request, response),
			SearcherCmd::SlowCheck { sequence } => self.check_slow(sequence),
			SearcherCmd::Flush(done) => {
				let _ = done.send(());
			}
		}
		self.sync_shared();
	}

	fn dispatch(&mut self, request: SequencedRequest) {
		let sequence = request.sequence;
		tracing::debug!(sequence, page = request.page, query = %request.query.text, "search request issued");
		self.pending.insert(
			sequence,
			PendingRequest {
				sequence,
				page: request.page,
				issued_at: Instant::now(),
			},
		);
		let _ = self.events.send(SearcherEvent::RequestIssued { sequence, page: request.page });

		let transport = Arc::clone(&self.transport);
		let cmd_tx = self.cmd_tx.clone();
		let cancel = self.cancel.clone();
		tokio::spawn(async move {
			let transport_request = TransportRequest::from(&request);
			let call = tokio::spawn(async move { transport.execute(transport_request).await });
			let abort = call.abort_handle();
			tokio::select! {
				() = cancel.cancelled() => abort.abort(),
				joined = call => {
					// A panicking transport still resolves its request.
					let response = joined.unwrap_or_else(|error| {
						tracing::error!(sequence, error = %error, "search transport task failed");
						Err(TransportError::Unavailable(format!("transport task failed: {error}")))
					});
					let _ = cmd_tx.send(SearcherCmd::Response { request, response });
				}
			}
		});

		if let Some(threshold) = self.config.slow_request_threshold {
			let cmd_tx = self.cmd_tx.clone();
			let cancel = self.cancel.clone();
			tokio::spawn(async move {
				tokio::select! {
					() = cancel.cancelled() => {}
					() = tokio::time::sleep(threshold) => {
						let _ = cmd_tx.send(SearcherCmd::SlowCheck { sequence });
					}
				}
			});
		}
	}

	fn apply_response(&mut self, request: SequencedRequest, response: Result<ResultPage, TransportError>) {
		let sequence = request.sequence;
		let elapsed = self.pending.remove(&sequence).map(|pending| pending.issued_at.elapsed());

		match self.sequencer.apply_response(&request, response) {
			Disposition::Discarded { newest_accepted } => {
				tracing::trace!(sequence, newest_accepted, "stale search response discarded");
				let _ = self.events.send(SearcherEvent::ResponseDiscarded { sequence, newest_accepted });
			}
			Disposition::Accepted(outcome) => {
				match &outcome {
					Ok(results) => {
						tracing::debug!(
							sequence,
							page = results.page(),
							hits = results.len(),
							total_hits = results.total_hits(),
							elapsed = ?elapsed,
							"search results accepted"
						);
						self.results = Some(results.clone());
						let _ = self.events.send(SearcherEvent::ResultsAccepted {
							sequence,
							page: results.page(),
							total_hits: results.total_hits(),
						});
					}
					Err(error) => {
						tracing::warn!(sequence, page = request.page, error = %error, "search request failed");
						let _ = self.events.send(SearcherEvent::ErrorAccepted {
							sequence,
							message: error.to_string(),
						});
					}
				}
				(self.on_result)(outcome);
			}
		}
	}

	fn check_slow(&self, sequence: u64) {
		let Some(pending) = self.pending.get(&sequence) else {
			return;
		};
		let elapsed = pending.issued_at.elapsed();
		tracing::warn!(sequence, page = pending.page, elapsed = ?elapsed, "search request is slow");
		let _ = self.events.send(SearcherEvent::RequestSlow {
			sequence,
			page: pending.page,
			elapsed,
		});
		if let Some(on_slow_request) = &self.on_slow_request {
			on_slow_request(pending);
		}
	}

	fn sync_shared(&self) {
		let mut shared = self.shared.write();
		if *shared.next_query != *self.sequencer.next_query() {
			shared.next_query = Arc::new(self.sequencer.next_query().clone());
		}
		shared.results = self.results.clone();
		shared.last_issued = self.sequencer.last_issued().map(|request| request.sequence);
		shared.last_accepted = self.sequencer.last_accepted().map(|request| request.sequence);
		shared.pending = self.pending.values().copied().collect();
	}
}

/// Configures and spawns a [`Searcher`].
pub struct SearcherBuilder<T> {
	transport: T,
	config: SearcherConfig,
	query: QuerySpec,
	on_slow_request: Option<SlowRequestHandler>,
}

impl<T: SearchTransport> SearcherBuilder<T> {
	#[must_use]
	pub fn config(mut self, config: SearcherConfig) -> Self {
		self.config = config;
		self
	}

	/// Sets the initial pending query.
	#[must_use]
	pub fn query(mut self, query: QuerySpec) -> Self {
		self.query = query;
		self
	}

	#[must_use]
	pub fn on_slow_request(mut self, handler: impl Fn(&PendingRequest) + Send + Sync + 'static) -> Self {
		self.on_slow_request = Some(Arc::new(handler));
		self
	}

	/// Spawns the actor on the current tokio runtime.
	///
	/// # Panics
	///
	/// Panics when called outside a tokio runtime.
	pub fn spawn(self, on_result: impl Fn(SearchOutcome) + Send + Sync + 'static) -> Searcher {
		let shared = Arc::new(RwLock::new(SearcherShared {
			next_query: Arc::new(self.query.clone()),
			..SearcherShared::default()
		}));
		let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
		let (events, _) = broadcast::channel(self.config.event_buffer.max(1));
		let cancel = CancellationToken::new();

		let actor = SearcherActor {
			sequencer: SearchSequencer::with_query(self.query),
			transport: Arc::new(self.transport),
			config: self.config,
			pending: BTreeMap::new(),
			results: None,
			on_result: Arc::new(on_result),
			on_slow_request: self.on_slow_request,
			events: events.clone(),
			shared: Arc::clone(&shared),
			cmd_tx: cmd_tx.clone(),
			cancel: cancel.clone(),
		};
		let task = tokio::spawn(actor.run(cmd_rx));

		Searcher {
			shared,
			cmd_tx,
			events,
			cancel,
			task: Some(task),
		}
	}
}

/// Handle to a running searcher actor.
///
/// Every method only enqueues a command; effects become visible in the
/// snapshot accessors once the actor has processed it (see [`Searcher::flush`]).
pub struct Searcher {
	shared: Arc<RwLock<SearcherShared>>,
	cmd_tx: mpsc::UnboundedSender<SearcherCmd>,
	events: broadcast::Sender<SearcherEvent>,
	cancel: CancellationToken,
	task: Option<JoinHandle<()>>,
}

impl Searcher {
	pub fn builder<T: SearchTransport>(transport: T) -> SearcherBuilder<T> {
		SearcherBuilder {
			transport,
			config: SearcherConfig::default(),
			query: QuerySpec::default(),
			on_slow_request: None,
		}
	}

	fn send(&self, cmd: SearcherCmd) -> bool {
		self.cmd_tx.send(cmd).is_ok()
	}

	/// Issues the initial page of the pending query.
	pub fn search(&self) -> bool {
		self.send(SearcherCmd::Search)
	}

	/// Requests the next page of the accepted results, if allowed.
	pub fn load_more(&self) -> bool {
		self.send(SearcherCmd::LoadMore)
	}

	/// Edits the pending query. Nothing is issued until `search`.
	pub fn update_query(&self, edit: impl FnOnce(&mut QuerySpec) + Send + 'static) -> bool {
		self.send(SearcherCmd::UpdateQuery(Box::new(edit)))
	}

	pub fn set_query(&self, query: QuerySpec) -> bool {
		self.update_query(move |next| *next = query)
	}

	pub fn set_facet_mode(&self, name: impl Into<String>, disjunctive: bool) -> bool {
		self.send(SearcherCmd::SetFacetMode {
			name: name.into(),
			disjunctive,
		})
	}

	/// Toggles a refinement judged against the state the user last saw.
	pub fn toggle_facet_refinement(&self, name: impl Into<String>, value: impl Into<String>) -> bool {
		self.send(SearcherCmd::ToggleFacetRefinement {
			name: name.into(),
			value: value.into(),
		})
	}

	pub fn next_query(&self) -> Arc<QuerySpec> {
		Arc::clone(&self.shared.read().next_query)
	}

	/// Latest accepted results.
	pub fn results(&self) -> Option<SearchResults> {
		self.shared.read().results.clone()
	}

	pub fn last_issued_sequence(&self) -> Option<u64> {
		self.shared.read().last_issued
	}

	pub fn last_accepted_sequence(&self) -> Option<u64> {
		self.shared.read().last_accepted
	}

	/// Requests issued but not yet answered, oldest first.
	pub fn pending_requests(&self) -> Arc<[PendingRequest]> {
		Arc::clone(&self.shared.read().pending)
	}

	pub fn subscribe(&self) -> broadcast::Receiver<SearcherEvent> {
		self.events.subscribe()
	}

	/// Waits until every command enqueued before this call has been processed.
	pub async fn flush(&self) {
		let (done_tx, done_rx) = oneshot::channel();
		if self.send(SearcherCmd::Flush(done_tx)) {
			let _ = done_rx.await;
		}
	}

	/// Stops the actor and cancels in-flight transport calls.
	pub async fn shutdown(mut self) {
		self.cancel.cancel();
		if let Some(task) = self.task.take()
			&& let Err(error) = task.await
		{
			tracing::warn!(error = %error, "searcher task ended abnormally");
		}
	}
}

impl Drop for Searcher {
	fn drop(&mut self) {
		self.cancel.cancel();
	}
}
