//! Prefix text matching and `<em>` highlighting.

use serde_json::{Value, json};

/// Lowercased words of a query; empty for a blank query.
pub(crate) fn query_words(text: &str) -> Vec<String> {
	text.split(|c: char| !c.is_alphanumeric())
		.filter(|word| !word.is_empty())
		.map(str::to_lowercase)
		.collect()
}

/// Alphanumeric runs of `value` with their byte offsets.
fn words(value: &str) -> impl Iterator<Item = (usize, &str)> {
	let mut start = None;
	let mut out = Vec::new();
	for (idx, c) in value.char_indices() {
		match (c.is_alphanumeric(), start) {
			(true, None) => start = Some(idx),
			(false, Some(begin)) => {
				out.push((begin, &value[begin..idx]));
				start = None;
			}
			_ => {}
		}
	}
	if let Some(begin) = start {
		out.push((begin, &value[begin..]));
	}
	out.into_iter()
}

/// Byte length of the prefix of `word` matching `query_word`, ignoring case.
fn prefix_len(word: &str, query_word: &str) -> Option<usize> {
	let mut chars = word.char_indices();
	for expected in query_word.chars() {
		let (_, actual) = chars.next()?;
		if !actual.to_lowercase().eq(expected.to_lowercase()) {
			return None;
		}
	}
	Some(chars.next().map_or(word.len(), |(idx, _)| idx))
}

/// True when every query word prefixes some word of `values`.
pub(crate) fn matches_all<'a>(values: impl IntoIterator<Item = &'a str> + Clone, query_words: &[String]) -> bool {
	query_words.iter().all(|query_word| {
		values
			.clone()
			.into_iter()
			.any(|value| words(value).any(|(_, word)| prefix_len(word, query_word).is_some()))
	})
}

/// Highlight object for one attribute value, in the wire shape.
pub(crate) fn highlight(value: &str, query_words: &[String]) -> Value {
	let mut markup = String::with_capacity(value.len());
	let mut matched: Vec<&str> = Vec::new();
	let mut cursor = 0;

	for (offset, word) in words(value) {
		let best = query_words
			.iter()
			.filter_map(|query_word| prefix_len(word, query_word).map(|len| (len, query_word.as_str())))
			.max_by_key(|(len, _)| *len);
		let Some((len, query_word)) = best else {
			continue;
		};
		if !matched.contains(&query_word) {
			matched.push(query_word);
		}
		markup.push_str(&value[cursor..offset]);
		markup.push_str("<em>");
		markup.push_str(&word[..len]);
		markup.push_str("</em>");
		cursor = offset + len;
	}
	markup.push_str(&value[cursor..]);

	let level = match matched.len() {
		0 => "none",
		n if n == query_words.len() => "full",
		_ => "partial",
	};
	json!({
		"value": markup,
		"matchLevel": level,
		"matchedWords": matched,
	})
}
