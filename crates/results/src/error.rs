//! Error types for result parsing and accumulation.

use thiserror::Error;

/// A page could not be merged into the accumulated results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
	/// The page does not directly follow the highest page already merged.
	#[error("non-contiguous page: expected page {expected}, got page {got}")]
	NonContiguousPage {
		/// The only page number that may be appended next.
		expected: usize,
		/// The page number that was offered.
		got: usize,
	},

	/// The page belongs to another logical query than the accumulated results.
	#[error("page {page} belongs to a different query than the accumulated results")]
	QueryMismatch {
		/// The page number that was offered.
		page: usize,
	},
}

/// A transport response payload is missing required fields or is ill-typed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid search response: {reason}")]
pub struct InvalidResponseError {
	pub reason: String,
}

impl InvalidResponseError {
	pub fn new(reason: impl Into<String>) -> Self {
		Self { reason: reason.into() }
	}
}
