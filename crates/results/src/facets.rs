use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::page::FacetCounts;

/// One facet value and the number of hits carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetValue {
	pub value: String,
	pub count: u64,
}

/// Lazily computed facet listings, shared by an accumulator and the
/// snapshots taken from it until the next merge replaces it.
#[derive(Debug, Default)]
pub(crate) struct FacetCache {
	values: Mutex<HashMap<String, Arc<[FacetValue]>>>,
}

impl FacetCache {
	pub(crate) fn get_or_compute(&self, name: &str, counts: &FacetCounts, refined: &BTreeMap<String, Vec<String>>) -> Arc<[FacetValue]> {
		let mut values = self.values.lock();
		if let Some(cached) = values.get(name) {
			return Arc::clone(cached);
		}
		let computed: Arc<[FacetValue]> = compute_facet_values(name, counts, refined).into();
		values.insert(name.to_string(), Arc::clone(&computed));
		computed
	}
}

/// Values of facet `name`, most frequent first (ties by value).
///
/// Refined values missing from the counts are appended with a zero count,
/// so a selected filter stays visible after it stops matching anything.
pub(crate) fn compute_facet_values(name: &str, counts: &FacetCounts, refined: &BTreeMap<String, Vec<String>>) -> Vec<FacetValue> {
	let returned = counts.get(name);
	let mut values: Vec<FacetValue> = returned
		.into_iter()
		.flatten()
		.map(|(value, count)| FacetValue {
			value: value.clone(),
			count: *count,
		})
		.collect();
	values.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

	for value in refined.get(name).into_iter().flatten() {
		let known = returned.is_some_and(|counts| counts.contains_key(value));
		if !known && !values.iter().any(|existing| existing.value == *value) {
			values.push(FacetValue {
				value: value.clone(),
				count: 0,
			});
		}
	}
	values
}
