use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// The error type a step action may return.
pub type ActionError = Box<dyn StdError + Send + Sync + 'static>;

/// Shorthand for the return type of a step action.
pub type StepResult<E = ActionError> = std::result::Result<(), E>;

/// What went wrong inside a step's action.
#[derive(Debug)]
pub enum StepError {
  /// The action returned an error.
  Action(ActionError),
  /// The action panicked, e.g. through `assert!` or `unwrap`.
  Panic { message: String },
}

impl StepError {
  /// Records an action error. A [`StepFailure::Step`] coming back from a
  /// nested step is unwrapped so the ancestor shares the child's error, and
  /// a [`StepFailure::Test`] from a nested context is recorded as the bare
  /// [`TestFailure`] it carries.
  pub(crate) fn from_action(error: ActionError) -> Arc<StepError> {
    match error.downcast::<StepFailure>() {
      Ok(failure) => match *failure {
        StepFailure::Step(inner) => inner,
        StepFailure::Test(failure) => Arc::new(StepError::Action(Box::new(failure))),
        other => Arc::new(StepError::Action(Box::new(other))),
      },
      Err(error) => Arc::new(StepError::Action(error)),
    }
  }

  /// Records a caught panic payload.
  pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Arc<StepError> {
    let payload = match payload.downcast::<StepFailure>() {
      Ok(failure) => return StepError::from_action(failure),
      Err(payload) => payload,
    };
    let message = if let Some(message) = payload.downcast_ref::<&'static str>() {
      (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
      message.clone()
    } else {
      "Box<dyn Any>".to_string()
    };
    Arc::new(StepError::Panic { message })
  }

  pub fn is_panic(&self) -> bool {
    matches!(self, StepError::Panic { .. })
  }

  /// The action's error as a concrete type, if it is one.
  pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
    match self {
      StepError::Action(error) => error.downcast_ref::<E>(),
      StepError::Panic { .. } => None,
    }
  }
}

impl fmt::Display for StepError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StepError::Action(error) => fmt::Display::fmt(error, f),
      StepError::Panic { message } => f.write_str(message),
    }
  }
}

impl StdError for StepError {
  fn source(&self) -> Option<&(dyn StdError + 'static)> {
    match self {
      StepError::Action(error) => error.source(),
      StepError::Panic { .. } => None,
    }
  }
}

/// How a reported test failure should be treated by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
  Failed,
  Inconclusive,
}

/// Why a test failure was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
  /// At least one step failed functionally.
  StepFailed,
  /// Every step passed, but at least one ran longer than its max duration.
  PerformanceThresholdExceeded,
}

/// A framework-level test failure carrying the rendered step report.
#[derive(Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TestFailure {
  kind: FailureKind,
  cause: FailureCause,
  message: String,
}

impl TestFailure {
  pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
    Self {
      kind,
      cause: FailureCause::StepFailed,
      message: message.into(),
    }
  }

  pub fn with_cause(mut self, cause: FailureCause) -> Self {
    self.cause = cause;
    self
  }

  pub fn kind(&self) -> FailureKind {
    self.kind
  }

  pub fn cause(&self) -> FailureCause {
    self.cause
  }

  pub fn message(&self) -> &str {
    &self.message
  }

  pub fn is_inconclusive(&self) -> bool {
    self.kind == FailureKind::Inconclusive
  }
}

// Tests returning `Result<(), StepFailure>` print the error with `{:?}`;
// keep the report readable there.
impl fmt::Debug for TestFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{:?} ({:?}):", self.kind, self.cause)?;
    f.write_str(&self.message)
  }
}

/// The error returned by the step declaration API.
#[derive(Error)]
pub enum StepFailure {
  /// The step failed and the failure was handed back to the enclosing step.
  #[error("{0}")]
  Step(Arc<StepError>),

  /// The step tree was rendered and the test failed.
  #[error("{0}")]
  Test(TestFailure),

  /// A fail-fast step was declared with no active `StepContext`.
  #[error("Invalid attempt to define a step without first creating a StepContext")]
  MissingExecutionContext,
}

impl StepFailure {
  /// The recorded step error, for failures handed back to an enclosing step.
  pub fn step_error(&self) -> Option<&Arc<StepError>> {
    match self {
      StepFailure::Step(error) => Some(error),
      _ => None,
    }
  }

  pub fn test_failure(&self) -> Option<&TestFailure> {
    match self {
      StepFailure::Test(failure) => Some(failure),
      _ => None,
    }
  }
}

impl fmt::Debug for StepFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StepFailure::Step(error) => write!(f, "Step({})", error),
      StepFailure::Test(failure) => fmt::Debug::fmt(failure, f),
      StepFailure::MissingExecutionContext => write!(f, "MissingExecutionContext"),
    }
  }
}

/// Errors raised while loading step settings.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Configuration file not found: {0}")]
  ConfigNotFound(String),

  #[error("Failed to read configuration file: {0}")]
  ConfigRead(#[from] std::io::Error),

  #[error("Failed to parse configuration: {0}")]
  ConfigParse(String),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn nested_step_failure_is_unwrapped_to_the_same_error() {
    let original = Arc::new(StepError::Panic {
      message: "boom".into(),
    });
    let propagated: ActionError = Box::new(StepFailure::Step(Arc::clone(&original)));

    let recorded = StepError::from_action(propagated);
    assert!(Arc::ptr_eq(&original, &recorded));
  }

  #[test]
  fn nested_test_failure_is_recorded_without_its_wrapper() {
    let reported = TestFailure::new(FailureKind::Failed, "FAIL>  inner check (0.000s)\n");
    let propagated: ActionError = Box::new(StepFailure::Test(reported.clone()));

    let recorded = StepError::from_action(propagated);
    assert_eq!(recorded.downcast_ref::<TestFailure>(), Some(&reported));
    assert!(recorded.downcast_ref::<StepFailure>().is_none());
  }

  #[test]
  fn panic_payloads_become_messages() {
    let from_str = StepError::from_panic(Box::new("static message"));
    let from_string = StepError::from_panic(Box::new(String::from("owned message")));
    let from_other = StepError::from_panic(Box::new(17u8));

    assert_eq!(from_str.to_string(), "static message");
    assert_eq!(from_string.to_string(), "owned message");
    assert_eq!(from_other.to_string(), "Box<dyn Any>");
    assert!(from_str.is_panic());
  }

  #[test]
  fn action_errors_keep_their_type() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing fixture");
    let recorded = StepError::from_action(Box::new(io));

    assert!(!recorded.is_panic());
    assert_eq!(
      recorded.downcast_ref::<std::io::Error>().map(|e| e.kind()),
      Some(std::io::ErrorKind::NotFound)
    );
  }
}
