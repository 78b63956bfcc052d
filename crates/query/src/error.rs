//! Error types for query construction and filter parsing.

use thiserror::Error;

/// Errors produced while decoding filters back into refinements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
	/// An encoded facet filter has no unescaped `:` between name and value.
	#[error("facet filter '{0}' has no name/value separator")]
	MissingSeparator(String),

	/// An encoded facet filter ends with a lone `\`.
	#[error("facet filter '{0}' ends with a dangling escape")]
	DanglingEscape(String),

	/// An encoded facet filter has an empty facet name.
	#[error("facet filter '{0}' has an empty facet name")]
	EmptyFacetName(String),

	/// A numeric filter could not be parsed as `attribute<op>value`.
	#[error("invalid numeric filter: {0}")]
	InvalidNumericFilter(String),
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
