use crate::adapter::{resolve_adapter, TestFrameworkAdapter};
use crate::error::{FailureCause, StepError, StepFailure, TestFailure};
use crate::flow::{self, StepScope};
use crate::node::StepNode;
use crate::render::Rendering;
use crate::settings::{PerformanceFailurePolicy, StepSettings};
use crate::step::{Step, StepOutcome};
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// What a context reported when it was finished without failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
  /// No step was ever declared.
  NoSteps,
  /// A fail-fast top-level step already reported the failing tree.
  AlreadyReported,
  /// Every step passed; carries the rendered tree.
  Passed(String),
}

/// The state shared by a [`StepContext`] and every flow attached to it.
pub(crate) struct ContextState {
  top_steps: Mutex<Vec<Arc<StepNode>>>,
  policy: Mutex<PerformanceFailurePolicy>,
  results_reported: AtomicBool,
  adapter: Arc<dyn TestFrameworkAdapter>,
  default_max_duration: Option<Duration>,
}

impl ContextState {
  fn new(adapter: Arc<dyn TestFrameworkAdapter>, settings: &StepSettings) -> Self {
    Self {
      top_steps: Mutex::new(Vec::new()),
      policy: Mutex::new(settings.performance_failure_policy),
      results_reported: AtomicBool::new(false),
      adapter,
      default_max_duration: settings.default_max_duration,
    }
  }

  /// Installs a context nobody owns, for continue-on-fail steps declared
  /// outside any `StepContext`. Its steps are tracked but never reported.
  pub(crate) fn install_detached() -> Arc<ContextState> {
    let state = Arc::new(ContextState::new(resolve_adapter(), StepSettings::global()));
    flow::replace_context(Some(Arc::clone(&state)));
    debug!("installed a detached step context");
    state
  }

  pub(crate) fn add_and_execute<F, R>(&self, declaration: Step, action: F) -> Result<(), StepFailure>
  where
    F: FnOnce() -> R,
    R: StepOutcome,
  {
    let parent = flow::current_step();
    let node = Arc::new(StepNode::new(
      declaration.description,
      declaration.max_duration.or(self.default_max_duration),
      declaration.fail_fast,
      declaration.location,
      parent.as_ref(),
    ));
    match &parent {
      Some(parent) => parent.add_child(Arc::clone(&node)),
      None => self.top_steps.lock().push(Arc::clone(&node)),
    }

    debug!(step = node.description(), "executing step");
    let (duration, result) = {
      let _scope = StepScope::enter(Arc::clone(&node));
      let started = Instant::now();
      let result = panic::catch_unwind(AssertUnwindSafe(|| action().into_result()));
      (started.elapsed(), result)
    };

    let error = match result {
      Ok(Ok(())) => None,
      Ok(Err(error)) => Some(StepError::from_action(error)),
      Err(payload) => Some(StepError::from_panic(payload)),
    };
    node.complete(duration, error.clone());

    let Some(error) = error else {
      debug!(step = node.description(), ?duration, "step passed");
      return Ok(());
    };
    warn!(step = node.description(), %error, "step failed");

    if !node.is_fail_fast() {
      return Ok(());
    }
    if parent.is_some() || node.in_continue_on_fail_scope() {
      return Err(StepFailure::Step(error));
    }
    Err(StepFailure::Test(self.report_failure()))
  }

  fn snapshot(&self) -> Vec<Arc<StepNode>> {
    self.top_steps.lock().clone()
  }

  fn render(&self) -> String {
    Rendering::new(&self.snapshot(), self.adapter.as_ref()).to_string()
  }

  fn report_failure(&self) -> TestFailure {
    let rendering = self.render();
    self.results_reported.store(true, Ordering::SeqCst);
    self.adapter.create_assertion_error(&rendering)
  }

  fn teardown(&self) -> Result<Summary, TestFailure> {
    let steps = self.snapshot();
    if steps.is_empty() {
      return Ok(Summary::NoSteps);
    }
    if self.results_reported.load(Ordering::SeqCst) {
      return Ok(Summary::AlreadyReported);
    }

    let rendering = Rendering::new(&steps, self.adapter.as_ref()).to_string();
    if !steps.iter().all(|s| s.tree_functional_passed()) {
      return Err(self.adapter.create_assertion_error(&rendering));
    }

    println!("{}", rendering);
    info!(steps = steps.len(), "all steps passed");

    if !steps.iter().all(|s| s.tree_performance_passed()) {
      let failure = match *self.policy.lock() {
        PerformanceFailurePolicy::FailTest => self.adapter.create_assertion_error(&rendering),
        PerformanceFailurePolicy::MarkInconclusive => {
          self.adapter.create_inconclusive_error(&rendering)
        }
      };
      return Err(failure.with_cause(FailureCause::PerformanceThresholdExceeded));
    }

    Ok(Summary::Passed(rendering))
  }
}

/// Owns one step tree and reports it when the context ends.
///
/// Creating a context makes it the active context of the current flow;
/// finishing or dropping it restores whatever was active before. Dropping a
/// context whose tree failed panics with the report, so a test that simply
/// lets its context fall out of scope still fails.
///
/// ```
/// use concise_steps::{step, StepContext, Summary};
///
/// let context = StepContext::new();
/// step("add", || assert_eq!(2 + 2, 4)).unwrap();
///
/// assert!(matches!(context.finish(), Ok(Summary::Passed(_))));
/// ```
pub struct StepContext {
  state: Arc<ContextState>,
  previous_context: Option<Arc<ContextState>>,
  previous_step: Option<Arc<StepNode>>,
  finished: bool,
  _not_send: PhantomData<*const ()>,
}

impl StepContext {
  /// Starts a context with the global settings and the adapter registered in
  /// the global container (libtest when none is registered).
  pub fn new() -> Self {
    Self::builder().begin()
  }

  pub fn builder() -> StepContextBuilder {
    StepContextBuilder::default()
  }

  fn install(state: Arc<ContextState>) -> Self {
    let previous_context = flow::replace_context(Some(Arc::clone(&state)));
    let previous_step = flow::replace_step(None);
    debug!("step context started");
    Self {
      state,
      previous_context,
      previous_step,
      finished: false,
      _not_send: PhantomData,
    }
  }

  pub fn performance_failure_policy(&self) -> PerformanceFailurePolicy {
    *self.state.policy.lock()
  }

  pub fn set_performance_failure_policy(&self, policy: PerformanceFailurePolicy) {
    *self.state.policy.lock() = policy;
  }

  /// Records `step` in this context's tree and runs `action` as that step.
  pub fn add_and_execute<F, R>(&self, step: Step, action: F) -> Result<(), StepFailure>
  where
    F: FnOnce() -> R,
    R: StepOutcome,
  {
    self.state.add_and_execute(step, action)
  }

  pub fn top_steps(&self) -> Vec<Arc<StepNode>> {
    self.state.snapshot()
  }

  /// Renders the tree as it stands. Has no side effects.
  pub fn render(&self) -> String {
    self.state.render()
  }

  pub fn results_reported(&self) -> bool {
    self.state.results_reported.load(Ordering::SeqCst)
  }

  /// Ends the context and reports its tree.
  pub fn finish(mut self) -> Result<Summary, TestFailure> {
    self.close()
  }

  fn close(&mut self) -> Result<Summary, TestFailure> {
    self.finished = true;
    flow::replace_context(self.previous_context.take());
    flow::replace_step(self.previous_step.take());
    self.state.teardown()
  }
}

impl Default for StepContext {
  fn default() -> Self {
    Self::new()
  }
}

impl Drop for StepContext {
  fn drop(&mut self) {
    if self.finished {
      return;
    }
    if let Err(failure) = self.close() {
      if thread::panicking() {
        warn!(%failure, "step context failed while already unwinding");
      } else {
        panic!("{}", failure);
      }
    }
  }
}

/// Configures a [`StepContext`] before it starts.
#[derive(Default)]
pub struct StepContextBuilder {
  adapter: Option<Arc<dyn TestFrameworkAdapter>>,
  settings: Option<StepSettings>,
  policy: Option<PerformanceFailurePolicy>,
}

impl StepContextBuilder {
  pub fn adapter(mut self, adapter: Arc<dyn TestFrameworkAdapter>) -> Self {
    self.adapter = Some(adapter);
    self
  }

  pub fn settings(mut self, settings: StepSettings) -> Self {
    self.settings = Some(settings);
    self
  }

  /// Overrides the policy from the settings.
  pub fn performance_failure_policy(mut self, policy: PerformanceFailurePolicy) -> Self {
    self.policy = Some(policy);
    self
  }

  pub fn begin(self) -> StepContext {
    let settings = self.settings.unwrap_or_else(|| StepSettings::global().clone());
    let adapter = self.adapter.unwrap_or_else(resolve_adapter);
    let state = ContextState::new(adapter, &settings);
    if let Some(policy) = self.policy {
      *state.policy.lock() = policy;
    }
    StepContext::install(Arc::new(state))
  }
}
