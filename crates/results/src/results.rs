use std::collections::BTreeMap;
use std::sync::Arc;

use marquee_query::QuerySpec;

use crate::accumulator::PageMeta;
use crate::facets::{FacetCache, FacetValue};
use crate::hit::Hit;
use crate::page::{FacetCounts, Origin};

/// Reconciled results delivered to the result handler for one accepted response.
#[derive(Debug, Clone)]
pub struct SearchResults {
	pub(crate) sequence: u64,
	pub(crate) query: Arc<QuerySpec>,
	pub(crate) hits: Arc<Vec<Hit>>,
	pub(crate) first_page: usize,
	pub(crate) meta: PageMeta,
	pub(crate) is_initial_page: bool,
	pub(crate) facet_counts: Arc<FacetCounts>,
	pub(crate) refined: Arc<BTreeMap<String, Vec<String>>>,
	pub(crate) facet_cache: Arc<FacetCache>,
}

impl SearchResults {
	/// Sequence number of the request whose response produced these results.
	pub fn sequence(&self) -> u64 {
		self.sequence
	}

	/// Query snapshot the results answer.
	pub fn query(&self) -> &QuerySpec {
		&self.query
	}

	/// Hits of every merged page, in order.
	pub fn hits(&self) -> &[Hit] {
		&self.hits
	}

	pub fn len(&self) -> usize {
		self.hits.len()
	}

	pub fn is_empty(&self) -> bool {
		self.hits.is_empty()
	}

	pub fn total_hits(&self) -> usize {
		self.meta.total_hits
	}

	pub fn total_pages(&self) -> usize {
		self.meta.total_pages
	}

	pub fn first_page(&self) -> usize {
		self.first_page
	}

	/// Last merged page.
	pub fn page(&self) -> usize {
		self.meta.page
	}

	pub fn hits_per_page(&self) -> usize {
		self.meta.hits_per_page
	}

	/// Processing time of the last merged page.
	pub fn processing_time_ms(&self) -> u64 {
		self.meta.processing_time_ms
	}

	pub fn origin(&self) -> Origin {
		self.meta.origin
	}

	pub fn exhaustive_facet_counts(&self) -> bool {
		self.meta.exhaustive_facet_counts
	}

	/// True when these results start a new query rather than extend one.
	pub fn is_initial_page(&self) -> bool {
		self.is_initial_page
	}

	pub fn has_more_pages(&self) -> bool {
		self.meta.page + 1 < self.meta.total_pages
	}

	/// Values of facet `name`, including zero-count entries for refined values.
	pub fn facets(&self, name: &str) -> Arc<[FacetValue]> {
		self.facet_cache.get_or_compute(name, &self.facet_counts, &self.refined)
	}
}
