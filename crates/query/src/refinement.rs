//! Single facet refinements and their filter string encoding.
//!
//! A refinement encodes as `name:value`, or `name:-value` when exclusive.
//! Backslash escapes `\` and `:` anywhere in the name or value, and a `-`
//! at the start of the value, so every `(name, value, inclusive)` triple
//! has exactly one encoding and decodes back unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};

const SEPARATOR: char = ':';
const ESCAPE: char = '\\';
const EXCLUSION: char = '-';

/// One `(facet, value)` selection, inclusive by default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FacetRefinement {
	/// Facet name (the attribute being filtered).
	pub name: String,
	/// Facet value.
	pub value: String,
	/// `false` filters the value out instead of in.
	pub inclusive: bool,
}

impl FacetRefinement {
	/// Creates an inclusive refinement.
	pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: value.into(),
			inclusive: true,
		}
	}

	/// Creates an exclusive refinement.
	pub fn excluding(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			inclusive: false,
			..Self::new(name, value)
		}
	}

	/// Returns true when this refinement targets `(name, value)`, whatever its inclusivity.
	pub fn targets(&self, name: &str, value: &str) -> bool {
		self.name == name && self.value == value
	}

	/// Encodes this refinement as a facet filter string.
	pub fn encode(&self) -> String {
		let mut out = String::with_capacity(self.name.len() + self.value.len() + 2);
		escape_into(&mut out, &self.name, false);
		out.push(SEPARATOR);
		if !self.inclusive {
			out.push(EXCLUSION);
		}
		escape_into(&mut out, &self.value, true);
		out
	}

	/// Decodes a facet filter string produced by [`Self::encode`].
	pub fn parse(filter: &str) -> Result<Self> {
		let mut name = String::new();
		let mut chars = filter.chars();
		let mut found_separator = false;
		while let Some(c) = chars.next() {
			match c {
				ESCAPE => match chars.next() {
					Some(escaped) => name.push(escaped),
					None => return Err(QueryError::DanglingEscape(filter.to_string())),
				},
				SEPARATOR => {
					found_separator = true;
					break;
				}
				other => name.push(other),
			}
		}
		if !found_separator {
			return Err(QueryError::MissingSeparator(filter.to_string()));
		}
		if name.is_empty() {
			return Err(QueryError::EmptyFacetName(filter.to_string()));
		}

		let rest = chars.as_str();
		let (inclusive, rest) = match rest.strip_prefix(EXCLUSION) {
			Some(stripped) => (false, stripped),
			None => (true, rest),
		};

		let mut value = String::with_capacity(rest.len());
		let mut chars = rest.chars();
		while let Some(c) = chars.next() {
			if c == ESCAPE {
				match chars.next() {
					Some(escaped) => value.push(escaped),
					None => return Err(QueryError::DanglingEscape(filter.to_string())),
				}
			} else {
				value.push(c);
			}
		}

		Ok(Self { name, value, inclusive })
	}
}

impl fmt::Display for FacetRefinement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.encode())
	}
}

fn escape_into(out: &mut String, raw: &str, is_value: bool) {
	for (i, c) in raw.chars().enumerate() {
		if c == ESCAPE || c == SEPARATOR || (is_value && i == 0 && c == EXCLUSION) {
			out.push(ESCAPE);
		}
		out.push(c);
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	#[test]
	fn encodes_plain_and_exclusive_refinements() {
		assert_eq!(FacetRefinement::new("genre", "Drama").encode(), "genre:Drama");
		assert_eq!(FacetRefinement::excluding("genre", "Horror").encode(), "genre:-Horror");
	}

	#[test]
	fn separator_inside_value_is_escaped() {
		let refinement = FacetRefinement::new("title", "Star Wars: Episode IV");
		let encoded = refinement.encode();
		assert_eq!(encoded, r"title:Star Wars\: Episode IV");
		assert_eq!(FacetRefinement::parse(&encoded), Ok(refinement));
	}

	#[test]
	fn leading_dash_in_value_is_not_an_exclusion() {
		let refinement = FacetRefinement::new("tag", "-1");
		let encoded = refinement.encode();
		assert_eq!(encoded, r"tag:\-1");

		let parsed = FacetRefinement::parse(&encoded).expect("parse");
		assert!(parsed.inclusive);
		assert_eq!(parsed.value, "-1");
	}

	#[test]
	fn unescaped_legacy_filters_still_parse() {
		let parsed = FacetRefinement::parse("genre:-Comedy").expect("parse");
		assert_eq!(parsed, FacetRefinement::excluding("genre", "Comedy"));
	}

	#[test]
	fn malformed_filters_are_rejected() {
		assert_eq!(FacetRefinement::parse("genre"), Err(QueryError::MissingSeparator("genre".into())));
		assert_eq!(FacetRefinement::parse(":Drama"), Err(QueryError::EmptyFacetName(":Drama".into())));
		assert_eq!(FacetRefinement::parse(r"genre:Dr\"), Err(QueryError::DanglingEscape(r"genre:Dr\".into())));
	}

	proptest! {
		#[test]
		fn any_refinement_decodes_to_itself(
			name in "[a-z:\\\\-]{1,8}",
			value in "[A-Za-z :\\\\-]{0,12}",
			inclusive in any::<bool>(),
		) {
			let refinement = FacetRefinement { name, value, inclusive };
			prop_assert_eq!(FacetRefinement::parse(&refinement.encode()), Ok(refinement));
		}
	}
}
