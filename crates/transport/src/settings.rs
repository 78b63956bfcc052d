use std::collections::BTreeSet;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Static behaviour of one index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IndexSettings {
	/// Attributes matched against the query text and highlighted, in priority order.
	pub searchable_attributes: Vec<String>,
	/// Attributes that may be refined and counted.
	pub attributes_for_faceting: BTreeSet<String>,
	/// Numeric attributes ordering matches, highest first.
	pub custom_ranking: Vec<String>,
	/// Page size used when the query does not set one.
	pub hits_per_page: usize,
}

impl Default for IndexSettings {
	fn default() -> Self {
		Self {
			searchable_attributes: Vec::new(),
			attributes_for_faceting: BTreeSet::new(),
			custom_ranking: Vec::new(),
			hits_per_page: 20,
		}
	}
}

impl IndexSettings {
	#[must_use]
	pub fn searchable(mut self, attributes: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.searchable_attributes = attributes.into_iter().map(Into::into).collect();
		self
	}

	#[must_use]
	pub fn faceting(mut self, attributes: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.attributes_for_faceting = attributes.into_iter().map(Into::into).collect();
		self
	}

	#[must_use]
	pub fn ranking(mut self, attributes: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.custom_ranking = attributes.into_iter().map(Into::into).collect();
		self
	}

	#[must_use]
	pub fn hits_per_page(mut self, hits_per_page: usize) -> Self {
		self.hits_per_page = hits_per_page;
		self
	}
}

/// Artificial delay applied before answering, so that concurrent requests
/// can complete out of order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulatedLatency {
	pub base: Duration,
	/// Upper bound of a uniformly random extra delay.
	pub jitter: Duration,
}

impl SimulatedLatency {
	pub const NONE: Self = Self {
		base: Duration::ZERO,
		jitter: Duration::ZERO,
	};

	pub fn new(base: Duration, jitter: Duration) -> Self {
		Self { base, jitter }
	}

	pub fn is_zero(&self) -> bool {
		self.base.is_zero() && self.jitter.is_zero()
	}

	/// Draws the delay for one request.
	pub fn sample(&self) -> Duration {
		if self.jitter.is_zero() {
			return self.base;
		}
		let jitter_ms = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
		self.base + Duration::from_millis(rand::rng().random_range(0..=jitter_ms))
	}
}
