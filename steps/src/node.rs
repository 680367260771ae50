use crate::error::StepError;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::fmt;
use std::panic::Location;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
struct Outcome {
  duration: Duration,
  error: Option<Arc<StepError>>,
}

/// One executed (or executing) step in the tree.
///
/// Nodes are shared between the context that owns the tree and any threads
/// adding children to them, so the child list sits behind a lock and the
/// outcome is written exactly once when the action completes.
pub struct StepNode {
  description: String,
  max_duration: Option<Duration>,
  fail_fast: bool,
  in_continue_on_fail_scope: bool,
  location: &'static Location<'static>,
  parent: Weak<StepNode>,
  children: Mutex<Vec<Arc<StepNode>>>,
  outcome: OnceCell<Outcome>,
}

impl StepNode {
  pub(crate) fn new(
    description: String,
    max_duration: Option<Duration>,
    fail_fast: bool,
    location: &'static Location<'static>,
    parent: Option<&Arc<StepNode>>,
  ) -> Self {
    let in_continue_on_fail_scope =
      parent.map_or(false, |parent| !parent.fail_fast || parent.in_continue_on_fail_scope);
    Self {
      description,
      max_duration,
      fail_fast,
      in_continue_on_fail_scope,
      location,
      parent: parent.map(Arc::downgrade).unwrap_or_default(),
      children: Mutex::new(Vec::new()),
      outcome: OnceCell::new(),
    }
  }

  pub(crate) fn add_child(&self, child: Arc<StepNode>) {
    self.children.lock().push(child);
  }

  pub(crate) fn complete(&self, duration: Duration, error: Option<Arc<StepError>>) {
    if self.outcome.set(Outcome { duration, error }).is_err() {
      warn!(step = %self.description, "step outcome recorded twice; keeping the first");
    }
  }

  pub fn description(&self) -> &str {
    &self.description
  }

  pub fn max_duration(&self) -> Option<Duration> {
    self.max_duration
  }

  pub fn is_fail_fast(&self) -> bool {
    self.fail_fast
  }

  /// True when some ancestor is a continue-on-fail step.
  pub fn in_continue_on_fail_scope(&self) -> bool {
    self.in_continue_on_fail_scope
  }

  /// Where the step was declared.
  pub fn location(&self) -> &'static Location<'static> {
    self.location
  }

  pub fn parent(&self) -> Option<Arc<StepNode>> {
    self.parent.upgrade()
  }

  /// A snapshot of the children added so far, in insertion order.
  pub fn children(&self) -> Vec<Arc<StepNode>> {
    self.children.lock().clone()
  }

  pub fn is_complete(&self) -> bool {
    self.outcome.get().is_some()
  }

  /// Elapsed time of the action; zero while it is still running.
  pub fn duration(&self) -> Duration {
    self.outcome.get().map(|o| o.duration).unwrap_or_default()
  }

  pub fn error(&self) -> Option<Arc<StepError>> {
    self.outcome.get().and_then(|o| o.error.clone())
  }

  /// The step's own action completed without error. Pending steps have not passed.
  pub fn functional_passed(&self) -> bool {
    matches!(self.outcome.get(), Some(Outcome { error: None, .. }))
  }

  pub fn performance_passed(&self) -> bool {
    self.max_duration.map_or(true, |max| self.duration() <= max)
  }

  /// This step and every descendant passed functionally.
  pub fn tree_functional_passed(&self) -> bool {
    self.functional_passed() && self.children().iter().all(|c| c.tree_functional_passed())
  }

  /// This step and every descendant finished within their max durations.
  pub fn tree_performance_passed(&self) -> bool {
    self.performance_passed() && self.children().iter().all(|c| c.tree_performance_passed())
  }
}

impl fmt::Debug for StepNode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StepNode")
      .field("description", &self.description)
      .field("max_duration", &self.max_duration)
      .field("fail_fast", &self.fail_fast)
      .field("location", &self.location)
      .field("outcome", &self.outcome.get())
      .field("children", &self.children.lock().len())
      .finish()
  }
}
