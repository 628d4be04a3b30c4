//! Shared fixtures for integration tests.

#![allow(dead_code)]

pub use std::sync::Arc;

pub use parking_lot::Mutex;
pub use time::{Duration, OffsetDateTime};

// std
use std::sync::atomic::{AtomicUsize, Ordering};
// self
use appauth_background::{
	alarm::ManualAlarmHost,
	auth::AuthTokenState,
	messaging::{LocalChannel, MessageBroker},
	refresh::{RefreshError, RefreshFuture, RefreshOutcome, TokenRefresher},
	runtime::TokioSpawner,
	scheduler::{RefreshScheduler, SchedulerConfig},
	store::MemoryTokenStore,
};

pub type TestScheduler =
	RefreshScheduler<MemoryTokenStore, ScriptedRefresher, ManualAlarmHost, TokioSpawner>;

/// Refresher double that counts calls and applies a scripted result.
#[derive(Debug)]
pub struct ScriptedRefresher {
	store: Arc<MemoryTokenStore>,
	calls: AtomicUsize,
	delay: Mutex<Option<std::time::Duration>>,
	next: Mutex<ScriptedResult>,
}
impl ScriptedRefresher {
	pub fn new(store: Arc<MemoryTokenStore>) -> Self {
		Self {
			store,
			calls: AtomicUsize::new(0),
			delay: Mutex::new(None),
			next: Mutex::new(ScriptedResult::Succeed),
		}
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	/// Makes every call sleep before completing, keeping the refresh in flight.
	pub fn set_delay(&self, delay: std::time::Duration) {
		*self.delay.lock() = Some(delay);
	}

	pub fn set_result(&self, result: ScriptedResult) {
		*self.next.lock() = result;
	}
}
impl TokenRefresher for ScriptedRefresher {
	fn refresh_access_token(&self) -> RefreshFuture<'_> {
		Box::pin(async move {
			let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
			let delay = *self.delay.lock();

			if let Some(delay) = delay {
				tokio::time::sleep(delay).await;
			}

			let next = *self.next.lock();

			match next {
				ScriptedResult::Succeed => {
					let current = self.store.snapshot();

					self.store.set(AuthTokenState {
						access_token: Some(format!("access-{call}").into()),
						access_token_expires_at: Some(
							OffsetDateTime::now_utc() + Duration::hours(2),
						),
						..current
					});

					Ok(RefreshOutcome::Refreshed)
				},
				ScriptedResult::Reject => Ok(RefreshOutcome::Rejected),
				ScriptedResult::Fail =>
					Err(RefreshError::Upstream { message: "token endpoint unreachable".into() }),
			}
		})
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptedResult {
	/// Rotate the access token and report success.
	Succeed,
	/// Report a refused refresh without touching the store.
	Reject,
	/// Return an upstream error.
	Fail,
}

#[derive(Debug)]
pub struct SchedulerFixture {
	pub scheduler: TestScheduler,
	pub store: Arc<MemoryTokenStore>,
	pub refresher: Arc<ScriptedRefresher>,
	pub alarms: Arc<ManualAlarmHost>,
}

/// Constructs a scheduler backed by in-memory collaborators and the current tokio runtime.
pub fn build_test_scheduler(initial: AuthTokenState) -> SchedulerFixture {
	let store = Arc::new(MemoryTokenStore::new(initial));
	let refresher = Arc::new(ScriptedRefresher::new(store.clone()));
	let alarms = Arc::new(ManualAlarmHost::default());
	let scheduler = RefreshScheduler::new(
		store.clone(),
		refresher.clone(),
		alarms.clone(),
		Arc::new(TokioSpawner::current()),
		SchedulerConfig::default(),
	);

	SchedulerFixture { scheduler, store, refresher, alarms }
}

/// Constructs a broker attached to a fresh in-process channel.
pub fn build_test_broker() -> (MessageBroker<LocalChannel>, Arc<LocalChannel>) {
	let channel = Arc::new(LocalChannel::default());
	let broker = MessageBroker::new(channel.clone());

	(broker, channel)
}
