//! Tokio-backed [`AlarmHost`] for hosts without a native alarms API.

// crates.io
use tokio::{
	runtime::Handle,
	task::JoinHandle,
	time::{self, Instant, MissedTickBehavior},
};
// self
use crate::{
	_prelude::*,
	alarm::{Alarm, AlarmError, AlarmHost, AlarmListener},
};

/// Runs one interval task per alarm name on a tokio runtime.
///
/// Registrations live as long as the process; hosts that suspend the process need a native
/// durable primitive instead.
pub struct TokioAlarmHost {
	handle: Handle,
	tasks: Mutex<HashMap<String, JoinHandle<()>>>,
	listeners: Arc<RwLock<Vec<AlarmListener>>>,
}
impl TokioAlarmHost {
	/// Creates a host that spawns interval tasks on `handle`.
	pub fn new(handle: Handle) -> Self {
		Self { handle, tasks: Default::default(), listeners: Default::default() }
	}

	/// Creates a host bound to the runtime the caller is running on.
	pub fn try_current() -> Result<Self, AlarmError> {
		let handle =
			Handle::try_current().map_err(|e| AlarmError::Host { message: e.to_string() })?;

		Ok(Self::new(handle))
	}
}
impl AlarmHost for TokioAlarmHost {
	fn create(&self, name: &str, period: Duration) -> Result<(), AlarmError> {
		let alarm = Alarm::new(name, period)?;
		let every = std::time::Duration::try_from(period)
			.map_err(|_| AlarmError::InvalidPeriod { period })?;
		let first = Instant::now().checked_add(every).ok_or(AlarmError::InvalidPeriod { period })?;
		let listeners = self.listeners.clone();
		let task = self.handle.spawn(async move {
			let mut ticker = time::interval_at(first, every);

			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

			loop {
				ticker.tick().await;

				let listeners = listeners.read().clone();

				for listener in listeners {
					listener(&alarm);
				}
			}
		});

		if let Some(previous) = self.tasks.lock().insert(name.to_owned(), task) {
			previous.abort();
		}

		Ok(())
	}

	fn clear(&self, name: &str) -> Result<bool, AlarmError> {
		match self.tasks.lock().remove(name) {
			Some(task) => {
				task.abort();

				Ok(true)
			},
			None => Ok(false),
		}
	}

	fn add_listener(&self, listener: AlarmListener) {
		self.listeners.write().push(listener);
	}
}
impl Drop for TokioAlarmHost {
	fn drop(&mut self) {
		for (_, task) in self.tasks.lock().drain() {
			task.abort();
		}
	}
}
impl Debug for TokioAlarmHost {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokioAlarmHost")
			.field("alarms", &self.tasks.lock().keys().collect::<Vec<_>>())
			.field("listeners", &self.listeners.read().len())
			.finish()
	}
}
