//! The seam between the step tracker and the test harness.

use crate::assert_context::AssertContext;
use crate::error::{FailureKind, StepError, TestFailure};
use concise_ioc::{constructor, global, implements, Component, Constructor, IocContainer, ResolveError};
use std::sync::Arc;
use tracing::warn;

/// Classifies step errors and builds the failures handed to the harness.
pub trait TestFrameworkAdapter: Send + Sync {
  /// Whether the error came from an assertion, as opposed to an unexpected error.
  fn is_assertion_error(&self, error: &StepError) -> bool;

  fn create_assertion_error(&self, message: &str) -> TestFailure;

  fn create_inconclusive_error(&self, message: &str) -> TestFailure;
}

/// Adapter for the built-in libtest harness.
///
/// Panics whose message starts with `assertion`, and actions that return a
/// [`TestFailure`], count as assertion failures. Created failures carry the
/// current [`AssertContext`] breadcrumb.
///
/// Classification only sees the panic message. `assert!`, `assert_eq!` and
/// `assert_ne!` without a custom message qualify, but `assert!(cond, "...")`
/// panics with the custom text alone and is reported as an unexpected error.
/// It still fails the step; only the report block differs. Return a
/// [`TestFailure`] from the action to force assertion-style reporting.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibtestAdapter;

impl TestFrameworkAdapter for LibtestAdapter {
  fn is_assertion_error(&self, error: &StepError) -> bool {
    match error {
      StepError::Panic { message } => message.starts_with("assertion"),
      StepError::Action(error) => error.is::<TestFailure>(),
    }
  }

  fn create_assertion_error(&self, message: &str) -> TestFailure {
    TestFailure::new(FailureKind::Failed, AssertContext::decorate(message))
  }

  fn create_inconclusive_error(&self, message: &str) -> TestFailure {
    TestFailure::new(FailureKind::Inconclusive, AssertContext::decorate(message))
  }
}

impl Component for LibtestAdapter {
  fn constructors() -> Vec<Constructor<Self>> {
    vec![constructor!(|| LibtestAdapter)]
  }
}
implements!(LibtestAdapter => dyn TestFrameworkAdapter);

/// Registers [`LibtestAdapter`] as the [`TestFrameworkAdapter`] of `container`.
///
/// Contexts resolve their adapter from the global container, so a suite
/// using another harness registers its own adapter there instead.
pub fn bootstrap<C: IocContainer>(container: &C) {
  container.register_transient::<dyn TestFrameworkAdapter, LibtestAdapter>();
}

pub(crate) fn resolve_adapter() -> Arc<dyn TestFrameworkAdapter> {
  match global().resolve::<dyn TestFrameworkAdapter>() {
    Ok(adapter) => adapter,
    Err(ResolveError::UnregisteredType { .. }) => Arc::new(LibtestAdapter),
    Err(err) => {
      warn!(%err, "failed to resolve the test framework adapter; using libtest");
      Arc::new(LibtestAdapter)
    }
  }
}
