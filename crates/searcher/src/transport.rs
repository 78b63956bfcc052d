//! Transport capability consumed by the searcher.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use marquee_query::QuerySpec;
use marquee_results::ResultPage;

use crate::error::TransportError;
use crate::sequencer::SequencedRequest;

/// Everything a transport needs to execute one sequenced request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
	pub sequence: u64,
	/// Immutable snapshot of the query at issue time.
	pub query: Arc<QuerySpec>,
	/// Page to fetch; may differ from `query.page` when loading more.
	pub page: usize,
	pub disjunctive_facets: BTreeSet<String>,
	/// Refinements flattened per facet, for disjunctive faceting.
	pub facet_refinements: BTreeMap<String, Vec<String>>,
}

impl From<&SequencedRequest> for TransportRequest {
	fn from(request: &SequencedRequest) -> Self {
		Self {
			sequence: request.sequence,
			query: Arc::clone(&request.query),
			page: request.page,
			disjunctive_facets: request.query.disjunctive_facets().clone(),
			facet_refinements: request.query.filters.build_filter_refinement_map(),
		}
	}
}

/// Executes search requests against some index.
///
/// Calls may run concurrently and complete in any order; the searcher
/// reconciles them. Implementations own any retry policy.
#[async_trait]
pub trait SearchTransport: Send + Sync + 'static {
	async fn execute(&self, request: TransportRequest) -> Result<ResultPage, TransportError>;
}

#[async_trait]
impl<T> SearchTransport for Arc<T>
where
	T: SearchTransport + ?Sized,
{
	async fn execute(&self, request: TransportRequest) -> Result<ResultPage, TransportError> {
		(**self).execute(request).await
	}
}
