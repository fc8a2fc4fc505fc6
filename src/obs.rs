//! Optional observability for login stages.
//!
//! Each stage of a login attempt runs inside a [`StageSpan`]. Opening one counts an attempt;
//! [`StageSpan::finish`] or [`StageSpan::complete`] closes it with an [`Outcome`].
//!
//! # Feature Flags
//!
//! - `tracing`: each stage is an `oauth2_nirror.stage` span with `stage` and `site` fields, and
//!   `outcome` recorded when the stage closes.
//! - `metrics`: `oauth2_nirror_stage_total{stage, outcome}` is incremented on open and on close.
//!
//! Error contents are never recorded; failures are only counted.

// self
use crate::_prelude::*;

/// Future returned by [`StageSpan::instrument`].
#[cfg(feature = "tracing")]
pub type InstrumentedStage<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`StageSpan::instrument`].
#[cfg(not(feature = "tracing"))]
pub type InstrumentedStage<F> = F;

/// Stages of one login attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
	/// Building the authorization redirect.
	Authorize,
	/// Exchanging the authorization code for tokens.
	Exchange,
	/// Fetching and normalizing the profile.
	Profile,
	/// Running the host's verify callback.
	Verify,
}
impl Stage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Stage::Authorize => "authorize",
			Stage::Exchange => "exchange",
			Stage::Profile => "profile",
			Stage::Verify => "verify",
		}
	}
}
impl Display for Stage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}

	/// Classifies a stage result.
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		if result.is_ok() { Outcome::Success } else { Outcome::Failure }
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One open login stage.
#[derive(Debug)]
#[must_use = "a stage must be closed with `finish` or `complete`"]
pub struct StageSpan {
	stage: Stage,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl StageSpan {
	/// Opens `stage` at call site `site` and counts the attempt.
	pub fn open(stage: Stage, site: &'static str) -> Self {
		record_stage_outcome(stage, Outcome::Attempt);

		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"oauth2_nirror.stage",
				stage = stage.as_str(),
				site,
				outcome = tracing::field::Empty
			);

			Self { stage, span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = site;

			Self { stage }
		}
	}

	/// Stage this span covers.
	pub fn stage(&self) -> Stage {
		self.stage
	}

	/// Runs synchronous work inside the span.
	pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
		#[cfg(feature = "tracing")]
		{
			self.span.in_scope(f)
		}
		#[cfg(not(feature = "tracing"))]
		{
			f()
		}
	}

	/// Attaches the span to `fut` without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedStage<Fut>
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

	/// Closes the stage with the outcome of `result`.
	pub fn finish<T, E>(self, result: &Result<T, E>) {
		self.complete(Outcome::of(result));
	}

	/// Closes the stage with `outcome`.
	pub fn complete(self, outcome: Outcome) {
		#[cfg(feature = "tracing")]
		self.span.record("outcome", outcome.as_str());

		record_stage_outcome(self.stage, outcome);
	}
}

/// Increments the stage counter via the global metrics recorder (when enabled).
pub fn record_stage_outcome(stage: Stage, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"oauth2_nirror_stage_total",
		"stage" => stage.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);

	#[cfg(not(feature = "metrics"))]
	let _ = (stage, outcome);
}
