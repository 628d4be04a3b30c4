// self
use crate::obs::TaskKind;

/// Records a task outcome via the global metrics recorder (when enabled).
pub fn record_task_outcome(kind: TaskKind, outcome: &'static str) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"appauth_background_task_total",
			"task" => kind.as_str(),
			"outcome" => outcome
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}
