// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing scheduler activity since construction.
#[derive(Debug, Default)]
pub struct SchedulerMetrics {
	checks: AtomicU64,
	attempts: AtomicU64,
	successes: AtomicU64,
	failures: AtomicU64,
	resets: AtomicU64,
}
impl SchedulerMetrics {
	/// Returns the number of freshness checks evaluated.
	pub fn checks(&self) -> u64 {
		self.checks.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh calls made to the external refresher.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh calls that minted new tokens.
	pub fn successes(&self) -> u64 {
		self.successes.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh calls that were rejected or errored.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	/// Returns the number of full resets triggered by an expired refresh token.
	pub fn resets(&self) -> u64 {
		self.resets.load(Ordering::Relaxed)
	}

	pub(crate) fn record_check(&self) {
		self.checks.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.successes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_reset(&self) {
		self.resets.fetch_add(1, Ordering::Relaxed);
	}
}
