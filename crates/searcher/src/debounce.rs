use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// Runs a callback once `delay` has passed without a newer call.
///
/// Each `call` cancels the callback scheduled by the previous one. Used to
/// coalesce bursts of query edits (slider drags, keystrokes) into one search.
#[derive(Debug)]
pub struct Debouncer {
	delay: Duration,
	pending: Mutex<Option<CancellationToken>>,
}

impl Debouncer {
	pub fn new(delay: Duration) -> Self {
		Self {
			delay,
			pending: Mutex::new(None),
		}
	}

	pub fn delay(&self) -> Duration {
		self.delay
	}

	/// Schedules `f` on the current tokio runtime, replacing any pending callback.
	pub fn call<F>(&self, f: F)
	where
		F: FnOnce() + Send + 'static,
	{
		let token = CancellationToken::new();
		if let Some(previous) = self.pending.lock().replace(token.clone()) {
			previous.cancel();
		}

		let delay = self.delay;
		tokio::spawn(async move {
			tokio::select! {
				() = token.cancelled() => {}
				() = tokio::time::sleep(delay) => f(),
			}
		});
	}

	/// Drops the pending callback, if any.
	pub fn cancel(&self) {
		if let Some(pending) = self.pending.lock().take() {
			pending.cancel();
		}
	}
}

impl Drop for Debouncer {
	fn drop(&mut self) {
		self.cancel();
	}
}
