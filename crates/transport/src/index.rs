use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use marquee_query::FilterTerm;
use marquee_results::{FacetCounts, Hit, Origin, ResultPage};
use marquee_searcher::{SearchTransport, TransportError, TransportRequest};
use serde_json::{Map, Value, json};
use tokio::time::Instant;

use crate::error::DatasetError;
use crate::filter::{facet_values, numeric_matches, term_matches};
use crate::matching::{highlight, matches_all, query_words};
use crate::settings::{IndexSettings, SimulatedLatency};

const BAD_REQUEST: u16 = 400;

/// A searchable record set held in memory.
///
/// Answers [`TransportRequest`]s with the same JSON payload a hosted index
/// would return, parsed through [`ResultPage::from_json`].
#[derive(Debug, Clone)]
pub struct MemoryIndex {
	name: String,
	settings: IndexSettings,
	records: Vec<Hit>,
	latency: SimulatedLatency,
	origin: Origin,
}

impl MemoryIndex {
	pub fn new(name: impl Into<String>, settings: IndexSettings, records: Vec<Hit>) -> Self {
		Self {
			name: name.into(),
			settings,
			records,
			latency: SimulatedLatency::NONE,
			origin: Origin::Remote,
		}
	}

	/// Loads records from a JSON array of objects. Every record needs an `objectID`.
	pub fn from_json(name: impl Into<String>, settings: IndexSettings, json: &str) -> Result<Self, DatasetError> {
		let name = name.into();
		let records: Vec<Hit> = serde_json::from_str(json).map_err(|source| DatasetError::Parse { name: name.clone(), source })?;
		if let Some(position) = records.iter().position(|record| record.object_id().is_none()) {
			return Err(DatasetError::MissingObjectId { name, position });
		}
		Ok(Self::new(name, settings, records))
	}

	#[must_use]
	pub fn with_latency(mut self, latency: SimulatedLatency) -> Self {
		self.latency = latency;
		self
	}

	#[must_use]
	pub fn with_origin(mut self, origin: Origin) -> Self {
		self.origin = origin;
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn settings(&self) -> &IndexSettings {
		&self.settings
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	fn rejected(message: impl Into<String>) -> TransportError {
		TransportError::Rejected {
			status: BAD_REQUEST,
			message: message.into(),
		}
	}

	fn validate(&self, request: &TransportRequest) -> Result<usize, TransportError> {
		let faceting = &self.settings.attributes_for_faceting;
		let facet_names = request
			.query
			.filters
			.terms()
			.iter()
			.map(FilterTerm::facet_name)
			.chain(request.disjunctive_facets.iter().map(String::as_str));
		for name in facet_names {
			if !faceting.contains(name) {
				return Err(Self::rejected(format!("attribute `{name}` is not declared in attributesForFaceting")));
			}
		}

		match request.query.hits_per_page.unwrap_or(self.settings.hits_per_page) {
			0 => Err(Self::rejected("hitsPerPage must be greater than 0")),
			hits_per_page => Ok(hits_per_page),
		}
	}

	/// Records matching text and numeric filters, plus every facet term except
	/// those on `skip_facet`.
	fn matching<'a>(&'a self, request: &TransportRequest, words: &[String], skip_facet: Option<&str>) -> Vec<&'a Hit> {
		let searchable = &self.settings.searchable_attributes;
		self.records
			.iter()
			.filter(|record| {
				let texts: Vec<&str> = searchable.iter().flat_map(|attribute| text_values(record, attribute)).collect();
				matches_all(texts.iter().copied(), words)
			})
			.filter(|record| request.query.numeric_refinements.iter().all(|numeric| numeric_matches(record, numeric)))
			.filter(|record| {
				request
					.query
					.filters
					.terms()
					.iter()
					.filter(|term| Some(term.facet_name()) != skip_facet)
					.all(|term| term_matches(record, term))
			})
			.collect()
	}

	fn rank(&self, hits: &mut [&Hit]) {
		if self.settings.custom_ranking.is_empty() {
			return;
		}
		hits.sort_by(|a, b| {
			for attribute in &self.settings.custom_ranking {
				let a = a.f64_at(attribute).unwrap_or(f64::NEG_INFINITY);
				let b = b.f64_at(attribute).unwrap_or(f64::NEG_INFINITY);
				match b.partial_cmp(&a) {
					Some(Ordering::Equal) | None => continue,
					Some(order) => return order,
				}
			}
			Ordering::Equal
		});
	}

	fn count_facets<'a>(&self, hits: impl IntoIterator<Item = &'a Hit> + Clone, facets: impl IntoIterator<Item = &'a String>) -> FacetCounts {
		let mut counts = FacetCounts::new();
		for facet in facets {
			let values: &mut BTreeMap<String, u64> = counts.entry(facet.clone()).or_default();
			for hit in hits.clone() {
				for value in facet_values(hit, facet) {
					*values.entry(value).or_default() += 1;
				}
			}
		}
		counts
	}

	fn decorate(&self, hit: &Hit, words: &[String]) -> Value {
		let mut object = hit.as_object().clone();
		let mut highlights = Map::new();
		for attribute in &self.settings.searchable_attributes {
			if let Some(text) = hit.str_at(attribute) {
				highlights.insert(attribute.clone(), highlight(text, words));
			}
		}
		object.insert("_highlightResult".into(), Value::Object(highlights));
		Value::Object(object)
	}

	/// Executes `request` synchronously and returns the wire payload.
	pub fn query(&self, request: &TransportRequest) -> Result<Value, TransportError> {
		let started = Instant::now();
		let hits_per_page = self.validate(request)?;
		let words = query_words(&request.query.text);

		let mut hits = self.matching(request, &words, None);
		self.rank(&mut hits);

		let nb_hits = hits.len();
		let nb_pages = nb_hits.div_ceil(hits_per_page);
		let facets = self.count_facets(hits.iter().copied(), &self.settings.attributes_for_faceting);

		let refined: BTreeSet<&str> = request.query.filters.terms().iter().map(FilterTerm::facet_name).collect();
		let mut disjunctive_facets = FacetCounts::new();
		for facet in &request.disjunctive_facets {
			let counts = if refined.contains(facet.as_str()) {
				let relaxed = self.matching(request, &words, Some(facet));
				self.count_facets(relaxed.iter().copied(), [facet])
			} else {
				self.count_facets(hits.iter().copied(), [facet])
			};
			disjunctive_facets.extend(counts);
		}

		let page_hits: Vec<Value> = hits
			.iter()
			.skip(request.page.saturating_mul(hits_per_page))
			.take(hits_per_page)
			.map(|hit| self.decorate(hit, &words))
			.collect();

		tracing::trace!(
			index = %self.name,
			sequence = request.sequence,
			page = request.page,
			nb_hits,
			"memory index query"
		);

		Ok(json!({
			"hits": page_hits,
			"page": request.page,
			"nbPages": nb_pages,
			"nbHits": nb_hits,
			"hitsPerPage": hits_per_page,
			"facets": facets,
			"disjunctiveFacets": disjunctive_facets,
			"processingTimeMS": u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
			"exhaustiveFacetsCount": true,
			"query": request.query.text,
		}))
	}
}

fn text_values<'a>(record: &'a Hit, attribute: &str) -> Vec<&'a str> {
	match record.value_at(attribute) {
		Some(Value::String(text)) => vec![text.as_str()],
		Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
		_ => Vec::new(),
	}
}

#[async_trait]
impl SearchTransport for MemoryIndex {
	async fn execute(&self, request: TransportRequest) -> Result<ResultPage, TransportError> {
		let delay = self.latency.sample();
		if !delay.is_zero() {
			tokio::time::sleep(delay).await;
		}
		let payload = self.query(&request)?;
		Ok(ResultPage::from_json(payload, self.origin)?)
	}
}
