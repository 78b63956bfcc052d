//! Highlight and snippet payloads attached to hits, and `<em>` markup parsing.

use std::ops::Range;

use serde::{Deserialize, Serialize};

const OPEN_TAG: &[u8] = b"<em>";
const CLOSE_TAG: &[u8] = b"</em>";

/// How much of an attribute matched the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchLevel {
	Full,
	Partial,
	None,
}

/// Highlighted form of one hit attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightResult {
	/// Attribute text with matches wrapped in `<em>` tags.
	pub value: String,
	#[serde(default)]
	pub match_level: Option<MatchLevel>,
	#[serde(default)]
	pub matched_words: Vec<String>,
}

impl HighlightResult {
	/// Strips the markup, returning plain text and emphasized byte ranges.
	pub fn emphasis(&self) -> Emphasis {
		parse_emphasis(&self.value)
	}
}

/// Snippeted form of one hit attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetResult {
	pub value: String,
	#[serde(default)]
	pub match_level: Option<MatchLevel>,
}

/// Plain text plus the byte ranges that were wrapped in `<em>` tags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Emphasis {
	pub text: String,
	pub ranges: Vec<Range<usize>>,
}

/// Removes `<em>`/`</em>` tags (ASCII case-insensitive) from `markup`.
///
/// An opening tag without a matching close is dropped and yields no range.
pub fn parse_emphasis(markup: &str) -> Emphasis {
	let bytes = markup.as_bytes();
	let mut text = String::with_capacity(markup.len());
	let mut ranges = Vec::new();
	let mut open: Option<usize> = None;
	let mut copied_from = 0;
	let mut i = 0;

	while i < bytes.len() {
		let tag = if starts_with_ignore_case(&bytes[i..], OPEN_TAG) {
			Some((OPEN_TAG.len(), true))
		} else if starts_with_ignore_case(&bytes[i..], CLOSE_TAG) {
			Some((CLOSE_TAG.len(), false))
		} else {
			None
		};

		let Some((len, opening)) = tag else {
			i += 1;
			continue;
		};

		text.push_str(&markup[copied_from..i]);
		if opening {
			if open.is_none() {
				open = Some(text.len());
			}
		} else if let Some(start) = open.take()
			&& start < text.len()
		{
			ranges.push(start..text.len());
		}
		i += len;
		copied_from = i;
	}
	text.push_str(&markup[copied_from..]);

	Emphasis { text, ranges }
}

fn starts_with_ignore_case(haystack: &[u8], needle: &[u8]) -> bool {
	haystack.len() >= needle.len() && haystack[..needle.len()].eq_ignore_ascii_case(needle)
}
