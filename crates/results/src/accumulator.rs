//! Merges successive pages of one logical query into one growing result set.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use marquee_query::QuerySpec;

use crate::error::SequenceError;
use crate::facets::{FacetCache, FacetValue};
use crate::hit::Hit;
use crate::page::{FacetCounts, Origin, ResultPage};
use crate::results::SearchResults;

/// Metadata of the most recently merged page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageMeta {
	pub(crate) page: usize,
	pub(crate) total_pages: usize,
	pub(crate) total_hits: usize,
	pub(crate) hits_per_page: usize,
	pub(crate) processing_time_ms: u64,
	pub(crate) origin: Origin,
	pub(crate) exhaustive_facet_counts: bool,
}

impl PageMeta {
	fn of(page: &ResultPage) -> Self {
		Self {
			page: page.page,
			total_pages: page.total_pages,
			total_hits: page.total_hits,
			hits_per_page: page.hits_per_page,
			processing_time_ms: page.processing_time_ms,
			origin: page.origin,
			exhaustive_facet_counts: page.exhaustive_facet_counts,
		}
	}
}

/// Accumulated results of one logical query.
///
/// Hits are concatenated in page order. Facet counts are not summed: each
/// page carries counts for the whole result set, so the latest page's
/// counts replace the previous ones.
#[derive(Debug)]
pub struct ResultAccumulator {
	query: Arc<QuerySpec>,
	refined: Arc<BTreeMap<String, Vec<String>>>,
	first_page: usize,
	hits: Arc<Vec<Hit>>,
	meta: PageMeta,
	facet_counts: Arc<FacetCounts>,
	facet_cache: Arc<FacetCache>,
}

impl ResultAccumulator {
	/// Starts accumulating `first_page` of the query described by `query`.
	pub fn new(first_page: ResultPage, query: Arc<QuerySpec>) -> Self {
		let meta = PageMeta::of(&first_page);
		Self {
			refined: Arc::new(query.filters.build_filter_refinement_map()),
			query,
			first_page: first_page.page,
			hits: Arc::new(first_page.hits),
			meta,
			facet_counts: Arc::new(first_page.facet_counts),
			facet_cache: Arc::default(),
		}
	}

	/// Discards everything and starts over from `first_page`.
	pub fn reset(&mut self, first_page: ResultPage, query: Arc<QuerySpec>) {
		*self = Self::new(first_page, query);
	}

	/// Appends the page directly following the last merged one.
	///
	/// Any other page number fails with [`SequenceError::NonContiguousPage`]
	/// and leaves the accumulator untouched.
	pub fn append(&mut self, page: ResultPage) -> Result<(), SequenceError> {
		let expected = self.meta.page + 1;
		if page.page != expected {
			return Err(SequenceError::NonContiguousPage { expected, got: page.page });
		}

		self.meta = PageMeta::of(&page);
		Arc::make_mut(&mut self.hits).extend(page.hits);
		self.facet_counts = Arc::new(page.facet_counts);
		self.facet_cache = Arc::default();
		Ok(())
	}

	/// Query the accumulated pages belong to.
	pub fn query(&self) -> &Arc<QuerySpec> {
		&self.query
	}

	pub fn disjunctive_facets(&self) -> &BTreeSet<String> {
		self.query.disjunctive_facets()
	}

	pub fn hits(&self) -> &[Hit] {
		&self.hits
	}

	pub fn total_merged_hits(&self) -> usize {
		self.hits.len()
	}

	/// Page the accumulation started from.
	pub fn first_page(&self) -> usize {
		self.first_page
	}

	/// Highest page merged so far.
	pub fn last_merged_page(&self) -> usize {
		self.meta.page
	}

	pub fn total_pages(&self) -> usize {
		self.meta.total_pages
	}

	pub fn total_hits(&self) -> usize {
		self.meta.total_hits
	}

	/// Returns true when the transport reported pages after the last merged one.
	pub fn has_more_pages(&self) -> bool {
		self.meta.page + 1 < self.meta.total_pages
	}

	/// Values of facet `name`, computed on first access after each merge.
	pub fn facet_values(&self, name: &str) -> Arc<[FacetValue]> {
		self.facet_cache.get_or_compute(name, &self.facet_counts, &self.refined)
	}

	/// Immutable view of the current state, tagged with the accepting request.
	///
	/// The snapshot shares storage with the accumulator; later merges copy on
	/// write and never alter a snapshot already handed out.
	pub fn snapshot(&self, sequence: u64, is_initial_page: bool) -> SearchResults {
		SearchResults {
			sequence,
			query: Arc::clone(&self.query),
			hits: Arc::clone(&self.hits),
			first_page: self.first_page,
			meta: self.meta,
			is_initial_page,
			facet_counts: Arc::clone(&self.facet_counts),
			refined: Arc::clone(&self.refined),
			facet_cache: Arc::clone(&self.facet_cache),
		}
	}
}
