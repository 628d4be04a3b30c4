//! Alarm-driven token refresh scheduler.
//!
//! [`RefreshScheduler::setup`] registers a durable wake-up with the host, attaches a single
//! listener for it, and immediately dispatches one freshness check so the gap between a process
//! restart and the next tick is covered. Every check reads the token store, resets it when the
//! refresh token has expired, and refreshes the access token when it expires within the
//! configured buffer. At most one refresh is in flight per scheduler; a failed refresh is logged
//! and picked up again by the next check.

mod config;
mod gate;
mod metrics;

pub use config::*;
pub use gate::*;
pub use metrics::SchedulerMetrics;

// std
use std::sync::atomic::{AtomicBool, Ordering};
// self
use crate::{
	_prelude::*,
	alarm::{Alarm, AlarmHost},
	auth::Freshness,
	obs::{TaskKind, TaskSpan},
	refresh::{RefreshOutcome, TokenRefresher},
	runtime::Spawn,
	store::TokenStore,
};

/// What a single freshness check did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CheckOutcome {
	/// No access or refresh token; nothing to maintain.
	Unauthorized,
	/// The refresh token expired and the token state was reset.
	AuthorizationExpired,
	/// The access token has no known expiry; nothing was done.
	UnknownExpiry,
	/// The access token outlives the buffer; nothing was done.
	Fresh,
	/// Another refresh was already in flight; this check skipped its own.
	InFlight,
	/// The refresher minted new tokens.
	Refreshed,
	/// The refresher reported failure.
	Rejected,
	/// The refresher returned an error.
	Failed,
	/// The token state could not be read.
	StoreUnavailable,
}
impl CheckOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CheckOutcome::Unauthorized => "unauthorized",
			CheckOutcome::AuthorizationExpired => "authorization_expired",
			CheckOutcome::UnknownExpiry => "unknown_expiry",
			CheckOutcome::Fresh => "fresh",
			CheckOutcome::InFlight => "in_flight",
			CheckOutcome::Refreshed => "refreshed",
			CheckOutcome::Rejected => "rejected",
			CheckOutcome::Failed => "failed",
			CheckOutcome::StoreUnavailable => "store_unavailable",
		}
	}
}
impl Display for CheckOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Keeps application tokens fresh across host suspensions.
///
/// The scheduler is cheap to clone; clones share the refresh gate, the listener flag, and the
/// metrics, so they behave as one process-wide instance.
pub struct RefreshScheduler<S, R, A, P>
where
	S: ?Sized + TokenStore,
	R: ?Sized + TokenRefresher,
	A: ?Sized + AlarmHost,
	P: ?Sized + Spawn,
{
	/// Durable wake-up primitive.
	pub alarms: Arc<A>,
	/// Executor used for fire-and-forget checks.
	pub spawner: Arc<P>,
	checker: Arc<FreshnessChecker<S, R>>,
	alarm_name: Arc<str>,
	check_interval: Duration,
	listener_attached: Arc<AtomicBool>,
}
impl<S, R, A, P> RefreshScheduler<S, R, A, P>
where
	S: 'static + ?Sized + TokenStore,
	R: 'static + ?Sized + TokenRefresher,
	A: 'static + ?Sized + AlarmHost,
	P: 'static + ?Sized + Spawn,
{
	/// Creates a scheduler. Nothing is registered until [`RefreshScheduler::setup`].
	pub fn new(
		store: Arc<S>,
		refresher: Arc<R>,
		alarms: Arc<A>,
		spawner: Arc<P>,
		config: SchedulerConfig,
	) -> Self {
		let checker = FreshnessChecker {
			store,
			refresher,
			gate: RefreshGate::default(),
			metrics: Default::default(),
			refresh_buffer: config.refresh_buffer(),
		};

		Self {
			alarms,
			spawner,
			checker: Arc::new(checker),
			alarm_name: config.alarm_name().into(),
			check_interval: config.check_interval(),
			listener_attached: Default::default(),
		}
	}

	/// Registers the wake-up, attaches its listener once, and dispatches an immediate check.
	///
	/// Calling it again re-registers the alarm under the same name (replacing it) and dispatches
	/// another immediate check; the listener is never attached twice.
	pub fn setup(&self) -> Result<()> {
		let span = TaskSpan::new(TaskKind::RefreshCheck, "setup");
		let _guard = span.enter();

		self.alarms.create(&self.alarm_name, self.check_interval)?;
		self.attach_listener();
		self.dispatch_check();

		Ok(())
	}

	/// Cancels the wake-up. Returns `false` if none was registered.
	///
	/// An in-flight refresh is not cancelled; it completes and releases the gate.
	pub fn teardown(&self) -> Result<bool> {
		let span = TaskSpan::new(TaskKind::RefreshCheck, "teardown");
		let _guard = span.enter();

		Ok(self.alarms.clear(&self.alarm_name)?)
	}

	/// Spawns a freshness check without awaiting it.
	pub fn dispatch_check(&self) {
		spawn_check(self.spawner.as_ref(), &self.checker);
	}

	/// Runs one freshness check against the current clock.
	pub async fn ensure_fresh_tokens(&self) -> CheckOutcome {
		self.checker.run(OffsetDateTime::now_utc()).await
	}

	/// Runs one freshness check as if the current instant were `now`.
	pub async fn ensure_fresh_tokens_at(&self, now: OffsetDateTime) -> CheckOutcome {
		self.checker.run(now).await
	}

	/// Returns `true` while a refresh is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.checker.gate.is_held()
	}

	/// Counters shared by every clone of this scheduler.
	pub fn metrics(&self) -> &SchedulerMetrics {
		&self.checker.metrics
	}

	/// Name of the durable wake-up.
	pub fn alarm_name(&self) -> &str {
		&self.alarm_name
	}

	fn attach_listener(&self) {
		if self.listener_attached.swap(true, Ordering::AcqRel) {
			return;
		}

		// The listener holds the checker and spawner only, so the alarm host never owns itself.
		let checker = self.checker.clone();
		let spawner = self.spawner.clone();
		let name = self.alarm_name.clone();

		self.alarms.add_listener(Arc::new(move |alarm: &Alarm| {
			if alarm.name == *name {
				spawn_check(spawner.as_ref(), &checker);
			}
		}));
	}
}
impl<S, R, A, P> Clone for RefreshScheduler<S, R, A, P>
where
	S: ?Sized + TokenStore,
	R: ?Sized + TokenRefresher,
	A: ?Sized + AlarmHost,
	P: ?Sized + Spawn,
{
	fn clone(&self) -> Self {
		Self {
			alarms: self.alarms.clone(),
			spawner: self.spawner.clone(),
			checker: self.checker.clone(),
			alarm_name: self.alarm_name.clone(),
			check_interval: self.check_interval,
			listener_attached: self.listener_attached.clone(),
		}
	}
}
impl<S, R, A, P> Debug for RefreshScheduler<S, R, A, P>
where
	S: ?Sized + TokenStore,
	R: ?Sized + TokenRefresher,
	A: ?Sized + AlarmHost,
	P: ?Sized + Spawn,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshScheduler")
			.field("alarm_name", &self.alarm_name)
			.field("check_interval", &self.check_interval)
			.field("refresh_buffer", &self.checker.refresh_buffer)
			.field("refreshing", &self.checker.gate.is_held())
			.field("listener_attached", &self.listener_attached.load(Ordering::Acquire))
			.finish()
	}
}

struct FreshnessChecker<S, R>
where
	S: ?Sized + TokenStore,
	R: ?Sized + TokenRefresher,
{
	store: Arc<S>,
	refresher: Arc<R>,
	gate: RefreshGate,
	metrics: SchedulerMetrics,
	refresh_buffer: Duration,
}
impl<S, R> FreshnessChecker<S, R>
where
	S: ?Sized + TokenStore,
	R: ?Sized + TokenRefresher,
{
	async fn run(&self, now: OffsetDateTime) -> CheckOutcome {
		let span = TaskSpan::new(TaskKind::RefreshCheck, "ensure_fresh_tokens");
		let outcome = span.instrument(self.evaluate(now, &span)).await;

		span.record_outcome(outcome.as_str());

		outcome
	}

	async fn evaluate(&self, now: OffsetDateTime, span: &TaskSpan) -> CheckOutcome {
		self.metrics.record_check();

		let state = match self.store.load().await {
			Ok(state) => state,
			Err(e) => {
				span.warn("Failed to read token state.", &e);

				return CheckOutcome::StoreUnavailable;
			},
		};

		match state.freshness_at(now, self.refresh_buffer) {
			Freshness::Unauthorized => CheckOutcome::Unauthorized,
			Freshness::RefreshExpired => {
				span.warn(
					"Refresh token expired; clearing authorization.",
					&Freshness::RefreshExpired,
				);

				if let Err(e) = self.store.reset().await {
					span.warn("Failed to clear token state.", &e);
				}

				self.metrics.record_reset();

				CheckOutcome::AuthorizationExpired
			},
			Freshness::UnknownExpiry => CheckOutcome::UnknownExpiry,
			Freshness::Fresh => CheckOutcome::Fresh,
			Freshness::Stale => self.refresh(span).await,
		}
	}

	async fn refresh(&self, span: &TaskSpan) -> CheckOutcome {
		let Some(_permit) = self.gate.try_acquire() else {
			return CheckOutcome::InFlight;
		};

		self.metrics.record_attempt();

		match self.refresher.refresh_access_token().await {
			Ok(RefreshOutcome::Refreshed) => {
				self.metrics.record_success();

				CheckOutcome::Refreshed
			},
			Ok(RefreshOutcome::Rejected) => {
				self.metrics.record_failure();
				span.warn(
					"Access token refresh was rejected; authorize again if it keeps failing.",
					&CheckOutcome::Rejected,
				);

				CheckOutcome::Rejected
			},
			Err(e) => {
				self.metrics.record_failure();
				span.warn("Access token refresh failed.", &e);

				CheckOutcome::Failed
			},
		}
	}
}

fn spawn_check<S, R, P>(spawner: &P, checker: &Arc<FreshnessChecker<S, R>>)
where
	S: 'static + ?Sized + TokenStore,
	R: 'static + ?Sized + TokenRefresher,
	P: ?Sized + Spawn,
{
	let checker = checker.clone();

	spawner.spawn(Box::pin(async move {
		checker.run(OffsetDateTime::now_utc()).await;
	}));
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::{
		alarm::ManualAlarmHost,
		auth::AuthTokenState,
		refresh::RefreshError,
		runtime::BoxTask,
		store::{MemoryTokenStore, StoreError, StoreFuture},
	};

	const NOW: OffsetDateTime = macros::datetime!(2025-06-01 12:00 UTC);

	struct BrokenStore;
	impl TokenStore for BrokenStore {
		fn load(&self) -> StoreFuture<'_, AuthTokenState> {
			Box::pin(async { Err(StoreError::Backend { message: "storage.local offline".into() }) })
		}

		fn replace(&self, _: AuthTokenState) -> StoreFuture<'_, ()> {
			Box::pin(async { Ok(()) })
		}
	}

	fn stale_state() -> AuthTokenState {
		AuthTokenState::default()
			.with_access_token("a")
			.with_refresh_token("r")
			.with_access_token_expires_at(NOW + Duration::minutes(5))
			.with_refresh_token_expires_at(NOW + Duration::days(30))
	}

	fn config_with_widest_buffer() -> SchedulerConfig {
		SchedulerConfig::builder()
			.refresh_buffer(MAX_REFRESH_BUFFER)
			.build()
			.expect("The largest accepted buffer should build.")
	}

	fn queued_spawner() -> (Arc<Mutex<Vec<BoxTask>>>, impl Fn(BoxTask) + Send + Sync) {
		let queue = Arc::new(Mutex::new(Vec::new()));
		let sink = queue.clone();

		(queue, move |task: BoxTask| sink.lock().push(task))
	}

	#[tokio::test]
	async fn store_failures_are_reported_not_raised() {
		let (_, spawner) = queued_spawner();
		let scheduler = RefreshScheduler::new(
			Arc::new(BrokenStore),
			Arc::new(|| async { Ok::<_, RefreshError>(RefreshOutcome::Refreshed) }),
			Arc::new(ManualAlarmHost::default()),
			Arc::new(spawner),
			SchedulerConfig::default(),
		);

		assert_eq!(scheduler.ensure_fresh_tokens_at(NOW).await, CheckOutcome::StoreUnavailable);
		assert_eq!(scheduler.metrics().attempts(), 0);
	}

	#[tokio::test]
	async fn refresher_errors_release_the_gate() {
		let (_, spawner) = queued_spawner();
		let scheduler = RefreshScheduler::new(
			Arc::new(MemoryTokenStore::new(stale_state())),
			Arc::new(|| async {
				Err::<RefreshOutcome, _>(RefreshError::Upstream { message: "HTTP 500".into() })
			}),
			Arc::new(ManualAlarmHost::default()),
			Arc::new(spawner),
			SchedulerConfig::default(),
		);

		assert_eq!(scheduler.ensure_fresh_tokens_at(NOW).await, CheckOutcome::Failed);
		assert!(!scheduler.is_refreshing());
		assert_eq!(scheduler.ensure_fresh_tokens_at(NOW).await, CheckOutcome::Failed);
		assert_eq!(scheduler.metrics().attempts(), 2);
		assert_eq!(scheduler.metrics().failures(), 2);
	}

	#[tokio::test]
	async fn widest_buffer_refreshes_instead_of_panicking() {
		let (_, spawner) = queued_spawner();
		let config = config_with_widest_buffer();
		let scheduler = RefreshScheduler::new(
			Arc::new(MemoryTokenStore::new(
				stale_state().with_access_token_expires_at(NOW + Duration::days(300)),
			)),
			Arc::new(|| async { Ok::<_, RefreshError>(RefreshOutcome::Refreshed) }),
			Arc::new(ManualAlarmHost::default()),
			Arc::new(spawner),
			config,
		);

		assert_eq!(scheduler.ensure_fresh_tokens_at(NOW).await, CheckOutcome::Refreshed);

		let end_of_range = AuthTokenState {
			refresh_token_expires_at: None,
			..stale_state().with_access_token_expires_at(macros::datetime!(9999-12-31 0:00 UTC))
		};
		let scheduler = RefreshScheduler::new(
			Arc::new(MemoryTokenStore::new(end_of_range)),
			Arc::new(|| async { Ok::<_, RefreshError>(RefreshOutcome::Refreshed) }),
			Arc::new(ManualAlarmHost::default()),
			Arc::new(queued_spawner().1),
			config_with_widest_buffer(),
		);

		assert_eq!(
			scheduler.ensure_fresh_tokens_at(macros::datetime!(9999-06-01 0:00 UTC)).await,
			CheckOutcome::Refreshed
		);
	}

	#[tokio::test]
	async fn setup_queues_one_immediate_check_per_call() {
		let (queue, spawner) = queued_spawner();
		let alarms = Arc::new(ManualAlarmHost::default());
		let scheduler = RefreshScheduler::new(
			Arc::new(MemoryTokenStore::default()),
			Arc::new(|| async { Ok::<_, RefreshError>(RefreshOutcome::Refreshed) }),
			alarms.clone(),
			Arc::new(spawner),
			SchedulerConfig::default(),
		);

		scheduler.setup().expect("First setup should succeed.");
		scheduler.clone().setup().expect("Second setup should succeed.");

		assert_eq!(queue.lock().len(), 2);
		assert_eq!(alarms.len(), 1);
		assert_eq!(alarms.listener_count(), 1);

		assert!(alarms.fire(DEFAULT_ALARM_NAME));
		assert_eq!(queue.lock().len(), 3);

		let tasks = std::mem::take(&mut *queue.lock());

		for task in tasks {
			task.await;
		}

		assert_eq!(scheduler.metrics().checks(), 3);
	}

	#[tokio::test]
	async fn foreign_alarms_are_ignored() {
		let (queue, spawner) = queued_spawner();
		let alarms = Arc::new(ManualAlarmHost::default());
		let scheduler = RefreshScheduler::new(
			Arc::new(MemoryTokenStore::default()),
			Arc::new(|| async { Ok::<_, RefreshError>(RefreshOutcome::Refreshed) }),
			alarms.clone(),
			Arc::new(spawner),
			SchedulerConfig::default(),
		);

		scheduler.setup().expect("Setup should succeed.");
		alarms.create("unrelated", Duration::minutes(1)).expect("Registration should succeed.");
		queue.lock().clear();

		assert!(alarms.fire("unrelated"));
		assert!(queue.lock().is_empty());
	}
}
