use std::time::Duration;

/// Tunables for a [`crate::Searcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearcherConfig {
	pub(crate) slow_request_threshold: Option<Duration>,
	pub(crate) event_buffer: usize,
}

impl Default for SearcherConfig {
	fn default() -> Self {
		Self {
			slow_request_threshold: None,
			event_buffer: 64,
		}
	}
}

impl SearcherConfig {
	/// Enables the slow-request watchdog; `None` disables it.
	#[must_use]
	pub fn slow_request_threshold(mut self, threshold: Option<Duration>) -> Self {
		self.slow_request_threshold = threshold;
		self
	}

	/// Sets the event broadcast buffer capacity.
	///
	/// # Panics
	///
	/// Panics if `size` is zero.
	#[must_use]
	pub fn event_buffer(mut self, size: usize) -> Self {
		assert!(size > 0, "event buffer size must be > 0");
		self.event_buffer = size;
		self
	}
}
