//! Durable wake-up contract consumed by the refresh scheduler.
//!
//! Browser hosts back [`AlarmHost`] with their alarms API, whose registrations survive
//! suspension of the background process. [`ManualAlarmHost`] lets a host (or a test) drive
//! ticks explicitly and [`TokioAlarmHost`] runs in-process intervals for long-lived daemons.

pub mod manual;
#[cfg(feature = "tokio")] pub mod interval;

pub use manual::ManualAlarmHost;
#[cfg(feature = "tokio")] pub use interval::TokioAlarmHost;

// self
use crate::_prelude::*;

/// Callback invoked by the host whenever any registered alarm fires.
pub type AlarmListener = Arc<dyn Fn(&Alarm) + Send + Sync>;

/// Named periodic wake-up registered with the host.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Alarm {
	/// Registration name; unique per host.
	pub name: String,
	/// Interval between firings.
	pub period: Duration,
}
impl Alarm {
	/// Creates an alarm description after validating the period.
	pub fn new(name: impl Into<String>, period: Duration) -> Result<Self, AlarmError> {
		if !period.is_positive() {
			return Err(AlarmError::InvalidPeriod { period });
		}

		Ok(Self { name: name.into(), period })
	}
}

/// Host primitive providing named, periodic wake-ups.
pub trait AlarmHost
where
	Self: Send + Sync,
{
	/// Registers (or replaces) the alarm called `name`. Never creates a duplicate.
	fn create(&self, name: &str, period: Duration) -> Result<(), AlarmError>;

	/// Cancels the alarm called `name`, returning `true` if one existed.
	fn clear(&self, name: &str) -> Result<bool, AlarmError>;

	/// Attaches a listener that observes every alarm firing on this host.
	fn add_listener(&self, listener: AlarmListener);
}

/// Failures raised by [`AlarmHost`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AlarmError {
	/// Alarm periods must be strictly positive.
	#[error("Alarm period must be positive, got {period}.")]
	InvalidPeriod {
		/// Rejected period.
		period: Duration,
	},
	/// Host refused or failed the registration.
	#[error("Alarm host failure: {message}.")]
	Host {
		/// Host-supplied reason.
		message: String,
	},
}
