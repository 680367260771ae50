//! The step declaration API.

use crate::context::ContextState;
use crate::error::{ActionError, StepFailure};
use crate::flow;
use std::panic::Location;
use std::time::Duration;

/// Converts what a step action returns into the tracker's result.
///
/// Implemented for `()` (actions that fail by panicking) and for any
/// `Result<(), E>` whose error converts into [`ActionError`].
pub trait StepOutcome {
  fn into_result(self) -> Result<(), ActionError>;
}

impl StepOutcome for () {
  fn into_result(self) -> Result<(), ActionError> {
    Ok(())
  }
}

impl<E: Into<ActionError>> StepOutcome for Result<(), E> {
  fn into_result(self) -> Result<(), ActionError> {
    self.map_err(Into::into)
  }
}

/// A step declaration: description, optional max duration and failure mode.
///
/// ```
/// use concise_steps::{Step, StepContext};
/// use std::time::Duration;
///
/// let context = StepContext::new();
/// Step::new("warm cache")
///   .max_duration(Duration::from_secs(5))
///   .run(|| ())
///   .unwrap();
/// context.finish().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Step {
  pub(crate) description: String,
  pub(crate) max_duration: Option<Duration>,
  pub(crate) fail_fast: bool,
  pub(crate) location: &'static Location<'static>,
}

impl Step {
  /// A fail-fast step declared at the caller's location.
  #[track_caller]
  pub fn new(description: impl Into<String>) -> Self {
    Self {
      description: description.into(),
      max_duration: None,
      fail_fast: true,
      location: Location::caller(),
    }
  }

  pub fn max_duration(mut self, max_duration: Duration) -> Self {
    self.max_duration = Some(max_duration);
    self
  }

  /// Records a failure of this step without stopping the enclosing flow.
  pub fn continue_on_fail(mut self) -> Self {
    self.fail_fast = false;
    self
  }

  pub fn description(&self) -> &str {
    &self.description
  }

  pub fn is_fail_fast(&self) -> bool {
    self.fail_fast
  }

  /// Runs `action` as this step in the current flow's context.
  ///
  /// A fail-fast step needs an active [`StepContext`](crate::StepContext);
  /// a continue-on-fail step installs an unreported one when there is none.
  pub fn run<F, R>(self, action: F) -> Result<(), StepFailure>
  where
    F: FnOnce() -> R,
    R: StepOutcome,
  {
    let context = match flow::current_context() {
      Some(context) => context,
      None if self.fail_fast => return Err(StepFailure::MissingExecutionContext),
      None => ContextState::install_detached(),
    };
    context.add_and_execute(self, action)
  }
}

/// Runs a fail-fast step.
///
/// On failure a nested step returns [`StepFailure::Step`], which the
/// enclosing action is expected to propagate with `?`. A failing top-level
/// step renders the whole tree and returns [`StepFailure::Test`].
#[track_caller]
pub fn step<F, R>(description: impl Into<String>, action: F) -> Result<(), StepFailure>
where
  F: FnOnce() -> R,
  R: StepOutcome,
{
  Step::new(description).run(action)
}

/// Runs a fail-fast step that fails when it takes longer than `max_duration`.
#[track_caller]
pub fn step_within<F, R>(
  description: impl Into<String>,
  max_duration: Duration,
  action: F,
) -> Result<(), StepFailure>
where
  F: FnOnce() -> R,
  R: StepOutcome,
{
  Step::new(description).max_duration(max_duration).run(action)
}

/// Runs a step whose failure is recorded but never returned.
#[track_caller]
pub fn continue_on_fail<F, R>(description: impl Into<String>, action: F) -> Result<(), StepFailure>
where
  F: FnOnce() -> R,
  R: StepOutcome,
{
  Step::new(description).continue_on_fail().run(action)
}

#[track_caller]
pub fn continue_on_fail_within<F, R>(
  description: impl Into<String>,
  max_duration: Duration,
  action: F,
) -> Result<(), StepFailure>
where
  F: FnOnce() -> R,
  R: StepOutcome,
{
  Step::new(description)
    .max_duration(max_duration)
    .continue_on_fail()
    .run(action)
}
