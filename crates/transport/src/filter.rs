//! Facet and numeric filter evaluation against one record.

use marquee_query::{FacetRefinement, FilterTerm, NumericRefinement};
use marquee_results::Hit;
use serde_json::Value;

/// Facet values of `attribute` on `record`; arrays contribute every scalar item.
pub(crate) fn facet_values(record: &Hit, attribute: &str) -> Vec<String> {
	fn scalar(value: &Value) -> Option<String> {
		match value {
			Value::String(text) => Some(text.clone()),
			Value::Number(number) => Some(number.to_string()),
			Value::Bool(flag) => Some(flag.to_string()),
			_ => None,
		}
	}

	match record.value_at(attribute) {
		Some(Value::Array(items)) => items.iter().filter_map(scalar).collect(),
		Some(value) => scalar(value).into_iter().collect(),
		None => Vec::new(),
	}
}

fn refinement_matches(record: &Hit, refinement: &FacetRefinement) -> bool {
	let present = facet_values(record, &refinement.name).iter().any(|value| *value == refinement.value);
	present == refinement.inclusive
}

/// A standalone term must match; an OR-group needs any member to match.
pub(crate) fn term_matches(record: &Hit, term: &FilterTerm) -> bool {
	match term {
		FilterTerm::Single(refinement) => refinement_matches(record, refinement),
		FilterTerm::AnyOf { refinements, .. } => refinements.iter().any(|refinement| refinement_matches(record, refinement)),
	}
}

/// Records lacking a numeric `attribute` never match.
pub(crate) fn numeric_matches(record: &Hit, refinement: &NumericRefinement) -> bool {
	record
		.f64_at(&refinement.attribute)
		.is_some_and(|value| refinement.op.matches(value, refinement.value))
}
