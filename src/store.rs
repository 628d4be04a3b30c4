//! Token store contract and the built-in observable in-memory store.

pub mod memory;

pub use memory::{MemoryTokenStore, StoreSubscription};

// self
use crate::{_prelude::*, auth::AuthTokenState};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage contract for the extension's application tokens.
///
/// The store is owned outside the scheduler: the scheduler reads it on every check and resets it
/// once the refresh token expires, while the external refresh operation writes new tokens with
/// [`TokenStore::replace`].
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Reads the current token state.
	fn load(&self) -> StoreFuture<'_, AuthTokenState>;

	/// Replaces the entire token state.
	fn replace(&self, state: AuthTokenState) -> StoreFuture<'_, ()>;

	/// Clears all four token fields.
	fn reset(&self) -> StoreFuture<'_, ()> {
		self.replace(AuthTokenState::default())
	}
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Stored payload could not be (de)serialized.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure (storage area unavailable, quota exceeded, ...).
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
