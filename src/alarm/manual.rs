//! Alarm host whose firings are triggered explicitly.

// std
use std::sync::atomic::{AtomicUsize, Ordering};
// self
use crate::{
	_prelude::*,
	alarm::{Alarm, AlarmError, AlarmHost, AlarmListener},
};

/// In-process [`AlarmHost`] that only fires when [`ManualAlarmHost::fire`] is called.
///
/// Useful when the real wake-up source lives outside Rust (a JS shim forwarding
/// `alarms.onAlarm`, a system timer) and in tests.
#[derive(Default)]
pub struct ManualAlarmHost {
	alarms: RwLock<HashMap<String, Alarm>>,
	listeners: RwLock<Vec<AlarmListener>>,
	creations: AtomicUsize,
}
impl ManualAlarmHost {
	/// Fires the alarm called `name`, notifying every listener.
	///
	/// Returns `false` without notifying anyone if no such alarm is registered.
	pub fn fire(&self, name: &str) -> bool {
		let Some(alarm) = self.alarms.read().get(name).cloned() else {
			return false;
		};
		let listeners = self.listeners.read().clone();

		for listener in listeners {
			listener(&alarm);
		}

		true
	}

	/// Returns the registration for `name`, if any.
	pub fn get(&self, name: &str) -> Option<Alarm> {
		self.alarms.read().get(name).cloned()
	}

	/// Number of live registrations.
	pub fn len(&self) -> usize {
		self.alarms.read().len()
	}

	/// Returns `true` if nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.alarms.read().is_empty()
	}

	/// Number of attached listeners.
	pub fn listener_count(&self) -> usize {
		self.listeners.read().len()
	}

	/// Number of successful [`AlarmHost::create`] calls, including replacements.
	pub fn create_calls(&self) -> usize {
		self.creations.load(Ordering::SeqCst)
	}
}
impl AlarmHost for ManualAlarmHost {
	fn create(&self, name: &str, period: Duration) -> Result<(), AlarmError> {
		let alarm = Alarm::new(name, period)?;

		self.alarms.write().insert(alarm.name.clone(), alarm);
		self.creations.fetch_add(1, Ordering::SeqCst);

		Ok(())
	}

	fn clear(&self, name: &str) -> Result<bool, AlarmError> {
		Ok(self.alarms.write().remove(name).is_some())
	}

	fn add_listener(&self, listener: AlarmListener) {
		self.listeners.write().push(listener);
	}
}
impl Debug for ManualAlarmHost {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ManualAlarmHost")
			.field("alarms", &*self.alarms.read())
			.field("listeners", &self.listener_count())
			.finish()
	}
}
