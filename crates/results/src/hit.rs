//! One search result record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::highlight::{HighlightResult, SnippetResult};

const OBJECT_ID: &str = "objectID";
const HIGHLIGHT_RESULT: &str = "_highlightResult";
const SNIPPET_RESULT: &str = "_snippetResult";
const RANKING_INFO: &str = "_rankingInfo";

/// A hit as returned by the transport: a JSON object in relevance order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hit(Map<String, Value>);

impl Hit {
	pub fn new(object: Map<String, Value>) -> Self {
		Self(object)
	}

	/// The raw JSON object.
	pub fn as_object(&self) -> &Map<String, Value> {
		&self.0
	}

	pub fn object_id(&self) -> Option<&str> {
		self.0.get(OBJECT_ID).and_then(Value::as_str)
	}

	/// Looks up a value by dotted key path, e.g. `"image.path"`.
	pub fn value_at(&self, path: &str) -> Option<&Value> {
		value_at_path(&self.0, path)
	}

	/// String value at a dotted key path.
	pub fn str_at(&self, path: &str) -> Option<&str> {
		self.value_at(path).and_then(Value::as_str)
	}

	/// Numeric value at a dotted key path.
	pub fn f64_at(&self, path: &str) -> Option<f64> {
		self.value_at(path).and_then(Value::as_f64)
	}

	/// Highlight payload for the attribute at `path`.
	pub fn highlight(&self, path: &str) -> Option<HighlightResult> {
		let highlights = self.0.get(HIGHLIGHT_RESULT)?.as_object()?;
		serde_json::from_value(value_at_path(highlights, path)?.clone()).ok()
	}

	/// Snippet payload for the attribute at `path`.
	pub fn snippet(&self, path: &str) -> Option<SnippetResult> {
		let snippets = self.0.get(SNIPPET_RESULT)?.as_object()?;
		serde_json::from_value(value_at_path(snippets, path)?.clone()).ok()
	}

	/// Ranking details, present when the query asked for them.
	pub fn ranking_info(&self) -> Option<RankingInfo> {
		serde_json::from_value(self.0.get(RANKING_INFO)?.clone()).ok()
	}
}

impl From<Map<String, Value>> for Hit {
	fn from(object: Map<String, Value>) -> Self {
		Self(object)
	}
}

/// Per-hit ranking criteria reported by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RankingInfo {
	pub nb_typos: Option<u32>,
	pub first_matched_word: Option<u32>,
	pub proximity_distance: Option<u32>,
	pub user_score: Option<u32>,
	pub geo_distance: Option<u32>,
	pub geo_precision: Option<u32>,
	pub nb_exact_words: Option<u32>,
	pub words: Option<u32>,
	pub filters: Option<u32>,
}

fn value_at_path<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
	let mut segments = path.split('.');
	let mut current = root.get(segments.next()?)?;
	for segment in segments {
		current = current.as_object()?.get(segment)?;
	}
	Some(current)
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn hit(value: Value) -> Hit {
		serde_json::from_value(value).expect("hit object")
	}

	#[test]
	fn dotted_paths_walk_nested_objects() {
		let hit = hit(json!({"objectID": "42", "image": {"path": "/a.jpg"}, "year": 1999}));
		assert_eq!(hit.object_id(), Some("42"));
		assert_eq!(hit.str_at("image.path"), Some("/a.jpg"));
		assert_eq!(hit.f64_at("year"), Some(1999.0));
		assert!(hit.value_at("image.missing").is_none());
		assert!(hit.value_at("year.deeper").is_none());
	}

	#[test]
	fn highlight_and_ranking_info_are_typed() {
		let hit = hit(json!({
			"title": "The Matrix",
			"_highlightResult": {"title": {"value": "The <em>Matrix</em>", "matchLevel": "full", "matchedWords": ["matrix"]}},
			"_snippetResult": {"title": {"value": "…<em>Matrix</em>", "matchLevel": "full"}},
			"_rankingInfo": {"nbTypos": 0, "words": 1},
		}));

		let highlight = hit.highlight("title").expect("highlight");
		assert_eq!(highlight.emphasis().text, "The Matrix");
		assert!(hit.snippet("title").is_some());
		assert!(hit.highlight("year").is_none());

		let ranking = hit.ranking_info().expect("ranking info");
		assert_eq!(ranking.nb_typos, Some(0));
		assert_eq!(ranking.words, Some(1));
		assert_eq!(ranking.geo_distance, None);
	}
}
