//! Plain-text rendering of results.

use std::fmt::Write as _;

use marquee_results::{Hit, Origin, SearchResults, parse_emphasis};

/// Label of one hit: the highlighted `attribute` with matches in brackets,
/// falling back to the raw value and then the object id.
pub fn hit_label(hit: &Hit, attribute: &str) -> String {
	if let Some(highlight) = hit.highlight(attribute) {
		let emphasis = parse_emphasis(&highlight.value);
		let mut label = String::with_capacity(emphasis.text.len() + 2 * emphasis.ranges.len());
		let mut cursor = 0;
		for range in &emphasis.ranges {
			label.push_str(&emphasis.text[cursor..range.start]);
			label.push('[');
			label.push_str(&emphasis.text[range.clone()]);
			label.push(']');
			cursor = range.end;
		}
		label.push_str(&emphasis.text[cursor..]);
		return label;
	}
	hit.str_at(attribute)
		.or_else(|| hit.object_id())
		.unwrap_or("<unnamed>")
		.to_string()
}

/// Hits `from..` of `results`, numbered from 1, with a trailing year when present.
pub fn hits(results: &SearchResults, attribute: &str, from: usize) -> String {
	let mut out = String::new();
	for (position, hit) in results.hits().iter().enumerate().skip(from) {
		let _ = write!(out, "{:>4}. {}", position + 1, hit_label(hit, attribute));
		if let Some(year) = hit.f64_at("year") {
			let _ = write!(out, " ({year})");
		}
		out.push('\n');
	}
	out
}

pub fn summary(results: &SearchResults) -> String {
	let origin = match results.origin() {
		Origin::Remote => "remote",
		Origin::Local => "local",
	};
	format!(
		"{} hits, {} shown, page {}/{} in {} ms ({origin})",
		results.total_hits(),
		results.len(),
		results.page() + 1,
		results.total_pages().max(1),
		results.processing_time_ms(),
	)
}

/// `name: value (count), ...`, refined values marked with `*`.
pub fn facet(results: &SearchResults, name: &str) -> String {
	let refinements = results.query().filters.build_filter_refinement_map();
	let refined = refinements.get(name);
	let values: Vec<String> = results
		.facets(name)
		.iter()
		.map(|value| {
			let marker = if refined.is_some_and(|values| values.contains(&value.value)) { "*" } else { "" };
			format!("{marker}{} ({})", value.value, value.count)
		})
		.collect();
	if values.is_empty() {
		format!("{name}: -")
	} else {
		format!("{name}: {}", values.join(", "))
	}
}
