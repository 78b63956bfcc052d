//! One page of results, and its JSON wire form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InvalidResponseError;
use crate::hit::Hit;

/// `facet name -> facet value -> count`.
pub type FacetCounts = BTreeMap<String, BTreeMap<String, u64>>;

/// Where a page was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
	#[default]
	Remote,
	/// Served by an offline mirror.
	Local,
}

/// One page of hits plus the aggregate metadata of the whole result set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultPage {
	/// Hits in relevance order.
	pub hits: Vec<Hit>,
	pub page: usize,
	pub total_pages: usize,
	pub total_hits: usize,
	pub hits_per_page: usize,
	/// Counts over the whole result set, not only this page.
	pub facet_counts: FacetCounts,
	pub processing_time_ms: u64,
	pub origin: Origin,
	pub exhaustive_facet_counts: bool,
}

#[derive(Deserialize)]
struct WirePage {
	hits: Vec<Hit>,
	page: usize,
	#[serde(rename = "nbPages")]
	nb_pages: usize,
	#[serde(rename = "nbHits")]
	nb_hits: usize,
	#[serde(rename = "hitsPerPage")]
	hits_per_page: usize,
	#[serde(default)]
	facets: FacetCounts,
	#[serde(default, rename = "disjunctiveFacets")]
	disjunctive_facets: FacetCounts,
	#[serde(default, rename = "processingTimeMS")]
	processing_time_ms: u64,
	#[serde(default = "default_exhaustive", rename = "exhaustiveFacetsCount")]
	exhaustive_facets_count: bool,
}

fn default_exhaustive() -> bool {
	true
}

impl ResultPage {
	/// Parses a transport response payload.
	///
	/// `disjunctiveFacets` counts take precedence over `facets` counts for the
	/// same facet name.
	pub fn from_json(payload: Value, origin: Origin) -> Result<Self, InvalidResponseError> {
		let wire: WirePage = serde_json::from_value(payload).map_err(|error| InvalidResponseError::new(error.to_string()))?;

		let mut facet_counts = wire.facets;
		facet_counts.extend(wire.disjunctive_facets);

		Ok(Self {
			hits: wire.hits,
			page: wire.page,
			total_pages: wire.nb_pages,
			total_hits: wire.nb_hits,
			hits_per_page: wire.hits_per_page,
			facet_counts,
			processing_time_ms: wire.processing_time_ms,
			origin,
			exhaustive_facet_counts: wire.exhaustive_facets_count,
		})
	}

	/// Returns true when a page after this one exists.
	pub fn has_next_page(&self) -> bool {
		self.page + 1 < self.total_pages
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn parses_wire_payload() {
		let page = ResultPage::from_json(
			json!({
				"hits": [{"objectID": "1", "title": "Heat"}],
				"page": 0,
				"nbPages": 3,
				"nbHits": 51,
				"hitsPerPage": 20,
				"facets": {"genre": {"Crime": 12, "Drama": 9}, "year": {"1995": 2}},
				"disjunctiveFacets": {"genre": {"Crime": 30, "Drama": 21, "Action": 4}},
				"processingTimeMS": 3,
			}),
			Origin::Local,
		)
		.expect("valid payload");

		assert_eq!(page.hits.len(), 1);
		assert_eq!(page.total_pages, 3);
		assert_eq!(page.total_hits, 51);
		assert_eq!(page.origin, Origin::Local);
		assert_eq!(page.facet_counts["genre"]["Crime"], 30);
		assert_eq!(page.facet_counts["genre"].len(), 3);
		assert_eq!(page.facet_counts["year"]["1995"], 2);
		assert!(page.exhaustive_facet_counts);
		assert!(page.has_next_page());
	}

	#[test]
	fn missing_required_fields_are_invalid() {
		let error = ResultPage::from_json(json!({"hits": [], "page": 0}), Origin::Remote).expect_err("missing nbPages");
		assert!(error.reason.contains("nbPages"), "unexpected reason: {}", error.reason);

		let error = ResultPage::from_json(json!({"hits": "nope", "page": 0, "nbPages": 1, "nbHits": 0, "hitsPerPage": 20}), Origin::Remote);
		assert!(error.is_err());
	}
}
