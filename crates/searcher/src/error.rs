//! Error taxonomy surfaced to result handlers.

use marquee_results::{InvalidResponseError, SequenceError};
use thiserror::Error;

/// Failure reported by a search transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
	/// The transport could not reach the search service.
	#[error("search service unavailable: {0}")]
	Unavailable(String),

	/// The search service refused the request.
	#[error("search request rejected ({status}): {message}")]
	Rejected {
		/// Status code reported by the service.
		status: u16,
		/// Reason reported by the service.
		message: String,
	},

	/// The service answered with a payload that could not be parsed.
	#[error(transparent)]
	Malformed(#[from] InvalidResponseError),
}

/// Error delivered to the result handler for an accepted response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
	#[error(transparent)]
	Transport(TransportError),

	#[error(transparent)]
	InvalidResponse(#[from] InvalidResponseError),

	/// The response could not be merged into the accumulated results.
	#[error(transparent)]
	Sequence(#[from] SequenceError),
}

impl From<TransportError> for SearchError {
	fn from(error: TransportError) -> Self {
		match error {
			TransportError::Malformed(invalid) => Self::InvalidResponse(invalid),
			other => Self::Transport(other),
		}
	}
}
