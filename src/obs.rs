//! Optional observability helpers for the scheduler and the broker.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `appauth_background.task` with the `task`, `stage`
//!   and `outcome` fields, plus warn/debug events for refresh failures and declined messages.
//! - Enable `metrics` to increment the `appauth_background_task_total` counter for every
//!   freshness check and every inbound message, labeled by `task` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Background task kinds observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskKind {
	/// Token freshness checks and the refreshes they trigger.
	RefreshCheck,
	/// Inbound message dispatch.
	Dispatch,
}
impl TaskKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TaskKind::RefreshCheck => "refresh_check",
			TaskKind::Dispatch => "dispatch",
		}
	}
}
impl Display for TaskKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
