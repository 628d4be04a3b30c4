//! Contract for the external operation that exchanges the refresh token for a new access token.
//!
//! The token exchange itself (HTTP call, signing, response parsing) lives outside this crate.
//! A successful refresh has already written the new tokens to the token store by the time it
//! returns.

// self
use crate::{_prelude::*, error::BoxError, store::StoreError};

/// Boxed future returned by [`TokenRefresher::refresh_access_token`].
pub type RefreshFuture<'a> =
	Pin<Box<dyn Future<Output = Result<RefreshOutcome, RefreshError>> + 'a + Send>>;

/// External refresh operation.
pub trait TokenRefresher
where
	Self: Send + Sync,
{
	/// Performs one refresh attempt.
	fn refresh_access_token(&self) -> RefreshFuture<'_>;
}
impl<F, Fut> TokenRefresher for F
where
	F: Fn() -> Fut + Send + Sync,
	Fut: 'static + Future<Output = Result<RefreshOutcome, RefreshError>> + Send,
{
	fn refresh_access_token(&self) -> RefreshFuture<'_> {
		Box::pin(self())
	}
}

/// Result of a refresh attempt that completed without raising.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefreshOutcome {
	/// New tokens were minted and applied to the token store.
	Refreshed,
	/// The provider declined the refresh; the token store is unchanged.
	Rejected,
}
impl RefreshOutcome {
	/// Returns `true` for [`RefreshOutcome::Refreshed`].
	pub const fn is_refreshed(self) -> bool {
		matches!(self, RefreshOutcome::Refreshed)
	}
}

/// Failures raised by [`TokenRefresher`] implementations.
#[derive(Debug, ThisError)]
pub enum RefreshError {
	/// Upstream answered with an unexpected response.
	#[error("Token refresh failed upstream: {message}.")]
	Upstream {
		/// Upstream- or implementer-supplied message.
		message: String,
	},
	/// Network or transport failure.
	#[error("Network error occurred while refreshing the access token.")]
	Transport {
		/// Transport-specific failure.
		#[source]
		source: BoxError,
	},
	/// Applying the new tokens to the store failed.
	#[error(transparent)]
	Storage(#[from] StoreError),
}
impl RefreshError {
	/// Wraps a transport-specific error.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}
}
