//! Process-local exclusivity flag for refresh attempts.

// crates.io
use async_lock::MutexGuardArc;
// self
use crate::_prelude::*;

/// At-most-one-refresh gate.
///
/// The gate starts open when its scheduler is constructed. [`RefreshGate::try_acquire`] never
/// waits: a caller that finds the gate held skips its refresh instead of queueing behind the
/// one in flight. The gate reopens when the returned permit is dropped, on every exit path.
#[derive(Clone, Debug, Default)]
pub struct RefreshGate(Arc<AsyncMutex<()>>);
impl RefreshGate {
	/// Takes the gate if it is open.
	pub fn try_acquire(&self) -> Option<RefreshPermit> {
		self.0.try_lock_arc().map(RefreshPermit)
	}

	/// Returns `true` while a permit is alive.
	pub fn is_held(&self) -> bool {
		self.0.try_lock().is_none()
	}
}

/// Proof of holding the [`RefreshGate`]; dropping it reopens the gate.
pub struct RefreshPermit(#[allow(dead_code)] MutexGuardArc<()>);
impl Debug for RefreshPermit {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("RefreshPermit(..)")
	}
}
