// self
use crate::{
	_prelude::*,
	obs::{self, TaskKind},
};

/// Future returned by [`TaskSpan::instrument`].
#[cfg(feature = "tracing")]
pub type InstrumentedTask<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`TaskSpan::instrument`]; the input future itself without `tracing`.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedTask<F> = F;

/// One unit of background work: a freshness check, a dispatch, a registration.
///
/// Events emitted through the span are parented to it even when it is not entered, so a check
/// can log from inside an instrumented future without holding a guard across `.await`.
#[derive(Clone, Debug)]
pub struct TaskSpan {
	kind: TaskKind,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl TaskSpan {
	/// Opens an `appauth_background.task` span with `task`, `stage` and an empty `outcome`.
	pub fn new(kind: TaskKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"appauth_background.task",
				task = kind.as_str(),
				stage,
				outcome = tracing::field::Empty
			);

			Self { kind, span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self { kind }
		}
	}

	/// Task kind the span was opened for.
	pub fn kind(&self) -> TaskKind {
		self.kind
	}

	/// Enters the span for a synchronous section.
	pub fn enter(&self) -> TaskSpanGuard<'_> {
		TaskSpanGuard {
			#[cfg(feature = "tracing")]
			_entered: self.span.enter(),
			#[cfg(not(feature = "tracing"))]
			_span: std::marker::PhantomData,
		}
	}

	/// Runs `fut` inside the span.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedTask<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	/// Stamps the final outcome on the span and counts it.
	pub fn record_outcome(&self, outcome: &'static str) {
		#[cfg(feature = "tracing")]
		self.span.record("outcome", outcome);

		obs::record_task_outcome(self.kind, outcome);
	}

	/// Emits a warn-level event under this span.
	pub fn warn(&self, message: &'static str, detail: &dyn Display) {
		#[cfg(feature = "tracing")]
		tracing::warn!(parent: &self.span, task = self.kind.as_str(), %detail, "{message}");
		#[cfg(not(feature = "tracing"))]
		let _ = (message, detail);
	}

	/// Emits a debug-level event under this span.
	pub fn debug(&self, message: &'static str, detail: &dyn Display) {
		#[cfg(feature = "tracing")]
		tracing::debug!(parent: &self.span, task = self.kind.as_str(), %detail, "{message}");
		#[cfg(not(feature = "tracing"))]
		let _ = (message, detail);
	}
}

/// Guard returned by [`TaskSpan::enter`]; leaves the span on drop.
pub struct TaskSpanGuard<'a> {
	#[cfg(feature = "tracing")]
	_entered: tracing::span::Entered<'a>,
	#[cfg(not(feature = "tracing"))]
	_span: std::marker::PhantomData<&'a TaskSpan>,
}
impl Debug for TaskSpanGuard<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TaskSpanGuard(..)")
	}
}
