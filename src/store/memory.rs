//! Observable in-memory [`TokenStore`] for embedding hosts and tests.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	auth::AuthTokenState,
	store::{StoreFuture, TokenStore},
};

type ChangeListener = Arc<dyn Fn(&AuthTokenState) + Send + Sync>;

/// Handle returned by [`MemoryTokenStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StoreSubscription(u64);

/// Thread-safe token store that keeps the state in-process and notifies subscribers on change.
#[derive(Default)]
pub struct MemoryTokenStore {
	state: RwLock<AuthTokenState>,
	listeners: RwLock<Vec<(StoreSubscription, ChangeListener)>>,
	next_id: AtomicU64,
}
impl MemoryTokenStore {
	/// Creates a store seeded with `state`.
	pub fn new(state: AuthTokenState) -> Self {
		Self { state: RwLock::new(state), ..Default::default() }
	}

	/// Returns a copy of the current state.
	pub fn snapshot(&self) -> AuthTokenState {
		self.state.read().clone()
	}

	/// Replaces the state and notifies subscribers.
	pub fn set(&self, state: AuthTokenState) {
		*self.state.write() = state.clone();

		// Listeners run outside the state lock so they can read the store.
		let listeners =
			self.listeners.read().iter().map(|(_, l)| l.clone()).collect::<Vec<_>>();

		for listener in listeners {
			listener(&state);
		}
	}

	/// Registers `listener` to be called with the new state after every change.
	pub fn subscribe<F>(&self, listener: F) -> StoreSubscription
	where
		F: 'static + Fn(&AuthTokenState) + Send + Sync,
	{
		let id = StoreSubscription(self.next_id.fetch_add(1, Ordering::Relaxed));

		self.listeners.write().push((id, Arc::new(listener)));

		id
	}

	/// Removes a subscription. Returns `false` if it was already gone.
	pub fn unsubscribe(&self, subscription: StoreSubscription) -> bool {
		let mut listeners = self.listeners.write();
		let before = listeners.len();

		listeners.retain(|(id, _)| *id != subscription);

		listeners.len() != before
	}
}
impl TokenStore for MemoryTokenStore {
	fn load(&self) -> StoreFuture<'_, AuthTokenState> {
		let state = self.snapshot();

		Box::pin(async move { Ok(state) })
	}

	fn replace(&self, state: AuthTokenState) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			self.set(state);

			Ok(())
		})
	}
}
impl Debug for MemoryTokenStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MemoryTokenStore")
			.field("state", &*self.state.read())
			.field("listeners", &self.listeners.read().len())
			.finish()
	}
}
