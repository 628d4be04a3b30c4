//! Fire-and-forget task spawning used for freshness checks triggered by alarms and startup.

// self
use crate::_prelude::*;

/// Boxed task handed to a [`Spawn`] implementation.
pub type BoxTask = Pin<Box<dyn Future<Output = ()> + 'static + Send>>;

/// Executor seam: runs a task to completion without the caller awaiting it.
///
/// Tasks given to a spawner already handle their own failures; implementations only need to
/// drive them.
pub trait Spawn
where
	Self: Send + Sync,
{
	/// Schedules `task` for execution.
	fn spawn(&self, task: BoxTask);
}
impl<F> Spawn for F
where
	F: Fn(BoxTask) + Send + Sync,
{
	fn spawn(&self, task: BoxTask) {
		self(task)
	}
}

/// [`Spawn`] implementation backed by a tokio runtime handle.
#[cfg(feature = "tokio")]
#[derive(Clone, Debug)]
pub struct TokioSpawner(tokio::runtime::Handle);
#[cfg(feature = "tokio")]
impl TokioSpawner {
	/// Wraps an explicit runtime handle.
	pub fn new(handle: tokio::runtime::Handle) -> Self {
		Self(handle)
	}

	/// Captures the runtime the caller is running on.
	///
	/// # Panics
	///
	/// Panics when called outside a tokio runtime, like [`tokio::runtime::Handle::current`].
	pub fn current() -> Self {
		Self(tokio::runtime::Handle::current())
	}
}
#[cfg(feature = "tokio")]
impl Spawn for TokioSpawner {
	fn spawn(&self, task: BoxTask) {
		// Detached; the task reports its own outcome.
		drop(self.0.spawn(task));
	}
}
