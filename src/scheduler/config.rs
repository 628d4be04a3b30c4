//! Scheduler configuration and its validating builder.

// self
use crate::{_prelude::*, error::ConfigError};

/// Alarm name used when none is configured.
pub const DEFAULT_ALARM_NAME: &str = "appauth-refresh";
/// Period of the durable wake-up.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::minutes(5);
/// Look-ahead window: access tokens expiring within it are refreshed.
pub const DEFAULT_REFRESH_BUFFER: Duration = Duration::minutes(10);
/// Longest accepted wake-up period.
pub const MAX_CHECK_INTERVAL: Duration = Duration::days(1);
/// Longest accepted look-ahead window.
pub const MAX_REFRESH_BUFFER: Duration = Duration::days(366);

/// Validated settings for a [`RefreshScheduler`](crate::scheduler::RefreshScheduler).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
	alarm_name: String,
	check_interval: Duration,
	refresh_buffer: Duration,
}
impl SchedulerConfig {
	/// Returns a builder seeded with the defaults.
	pub fn builder() -> SchedulerConfigBuilder {
		SchedulerConfigBuilder::default()
	}

	/// Fixed name of the durable wake-up.
	pub fn alarm_name(&self) -> &str {
		&self.alarm_name
	}

	/// Period of the durable wake-up.
	pub fn check_interval(&self) -> Duration {
		self.check_interval
	}

	/// Look-ahead window before access token expiry.
	pub fn refresh_buffer(&self) -> Duration {
		self.refresh_buffer
	}
}
impl Default for SchedulerConfig {
	fn default() -> Self {
		Self {
			alarm_name: DEFAULT_ALARM_NAME.into(),
			check_interval: DEFAULT_CHECK_INTERVAL,
			refresh_buffer: DEFAULT_REFRESH_BUFFER,
		}
	}
}

/// Builder for [`SchedulerConfig`].
#[derive(Clone, Debug)]
pub struct SchedulerConfigBuilder {
	alarm_name: String,
	check_interval: Duration,
	refresh_buffer: Duration,
}
impl SchedulerConfigBuilder {
	/// Overrides the alarm name.
	pub fn alarm_name(mut self, name: impl Into<String>) -> Self {
		self.alarm_name = name.into();

		self
	}

	/// Overrides the wake-up period.
	pub fn check_interval(mut self, interval: Duration) -> Self {
		self.check_interval = interval;

		self
	}

	/// Overrides the look-ahead buffer.
	pub fn refresh_buffer(mut self, buffer: Duration) -> Self {
		self.refresh_buffer = buffer;

		self
	}

	/// Validates the settings and produces a [`SchedulerConfig`].
	pub fn build(self) -> Result<SchedulerConfig, ConfigError> {
		if self.alarm_name.trim().is_empty() {
			return Err(ConfigError::EmptyAlarmName);
		}
		if !self.check_interval.is_positive() {
			return Err(ConfigError::NonPositiveInterval { interval: self.check_interval });
		}
		if self.check_interval > MAX_CHECK_INTERVAL {
			return Err(ConfigError::IntervalTooLong {
				interval: self.check_interval,
				max: MAX_CHECK_INTERVAL,
			});
		}
		if self.refresh_buffer.is_negative() {
			return Err(ConfigError::NegativeBuffer { buffer: self.refresh_buffer });
		}
		if self.refresh_buffer > MAX_REFRESH_BUFFER {
			return Err(ConfigError::BufferTooLarge {
				buffer: self.refresh_buffer,
				max: MAX_REFRESH_BUFFER,
			});
		}

		Ok(SchedulerConfig {
			alarm_name: self.alarm_name,
			check_interval: self.check_interval,
			refresh_buffer: self.refresh_buffer,
		})
	}
}
impl Default for SchedulerConfigBuilder {
	fn default() -> Self {
		let SchedulerConfig { alarm_name, check_interval, refresh_buffer } =
			SchedulerConfig::default();

		Self { alarm_name, check_interval, refresh_buffer }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_match_named_constants() {
		let config =
			SchedulerConfig::builder().build().expect("Default settings should be valid.");

		assert_eq!(config, SchedulerConfig::default());
		assert_eq!(config.alarm_name(), DEFAULT_ALARM_NAME);
		assert_eq!(config.check_interval(), Duration::minutes(5));
		assert_eq!(config.refresh_buffer(), Duration::minutes(10));
	}

	#[test]
	fn builder_rejects_invalid_settings() {
		assert_eq!(
			SchedulerConfig::builder().alarm_name("  ").build(),
			Err(ConfigError::EmptyAlarmName)
		);
		assert_eq!(
			SchedulerConfig::builder().check_interval(Duration::ZERO).build(),
			Err(ConfigError::NonPositiveInterval { interval: Duration::ZERO })
		);
		assert_eq!(
			SchedulerConfig::builder().refresh_buffer(Duration::seconds(-1)).build(),
			Err(ConfigError::NegativeBuffer { buffer: Duration::seconds(-1) })
		);
	}

	#[test]
	fn builder_caps_interval_and_buffer() {
		assert_eq!(
			SchedulerConfig::builder().check_interval(Duration::days(2)).build(),
			Err(ConfigError::IntervalTooLong {
				interval: Duration::days(2),
				max: MAX_CHECK_INTERVAL
			})
		);
		assert_eq!(
			SchedulerConfig::builder().refresh_buffer(Duration::days(365 * 20_000)).build(),
			Err(ConfigError::BufferTooLarge {
				buffer: Duration::days(365 * 20_000),
				max: MAX_REFRESH_BUFFER
			})
		);

		let widest = SchedulerConfig::builder()
			.check_interval(MAX_CHECK_INTERVAL)
			.refresh_buffer(MAX_REFRESH_BUFFER)
			.build()
			.expect("Settings at the caps should be valid.");

		assert_eq!(widest.refresh_buffer(), MAX_REFRESH_BUFFER);
	}

	#[test]
	fn zero_buffer_is_allowed() {
		let config = SchedulerConfig::builder()
			.alarm_name("bewly-auth")
			.check_interval(Duration::minutes(1))
			.refresh_buffer(Duration::ZERO)
			.build()
			.expect("A zero buffer only refreshes expired tokens and is valid.");

		assert_eq!(config.alarm_name(), "bewly-auth");
		assert!(config.refresh_buffer().is_zero());
	}
}
