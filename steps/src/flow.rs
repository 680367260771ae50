//! Flow-local state: the active context, the current step and the assertion
//! scope of the running logical flow.
//!
//! Each thread is its own flow. Work handed to another thread does not see
//! the caller's state unless it runs inside [`Flow::attach`] on a [`fork`]
//! taken by the caller.

use crate::assert_context::{self, Frame};
use crate::context::ContextState;
use crate::node::StepNode;
use std::cell::RefCell;
use std::sync::Arc;

thread_local! {
  static CURRENT_CONTEXT: RefCell<Option<Arc<ContextState>>> = RefCell::new(None);
  static CURRENT_STEP: RefCell<Option<Arc<StepNode>>> = RefCell::new(None);
}

pub(crate) fn current_context() -> Option<Arc<ContextState>> {
  CURRENT_CONTEXT.with(|current| current.borrow().clone())
}

pub(crate) fn replace_context(context: Option<Arc<ContextState>>) -> Option<Arc<ContextState>> {
  CURRENT_CONTEXT.with(|current| current.replace(context))
}

pub(crate) fn current_step() -> Option<Arc<StepNode>> {
  CURRENT_STEP.with(|current| current.borrow().clone())
}

pub(crate) fn replace_step(step: Option<Arc<StepNode>>) -> Option<Arc<StepNode>> {
  CURRENT_STEP.with(|current| current.replace(step))
}

/// Makes a step current for the lifetime of the guard.
pub(crate) struct StepScope {
  previous: Option<Arc<StepNode>>,
}

impl StepScope {
  pub(crate) fn enter(step: Arc<StepNode>) -> Self {
    Self {
      previous: replace_step(Some(step)),
    }
  }
}

impl Drop for StepScope {
  fn drop(&mut self) {
    replace_step(self.previous.take());
  }
}

/// A snapshot of the calling flow's state, for continuing it on another thread.
///
/// Steps declared inside [`Flow::attach`] join the same context and nest
/// under the step that was current when the flow was forked.
///
/// ```
/// use concise_steps::{flow, step, StepContext, StepResult};
/// use std::thread;
///
/// let context = StepContext::new();
/// step("fan out", || -> StepResult {
///   let flow = flow::fork();
///   thread::scope(|s| {
///     for shard in 0..2 {
///       let flow = flow.clone();
///       s.spawn(move || flow.attach(|| step(format!("shard {shard}"), || ())));
///     }
///   });
///   Ok(())
/// })
/// .unwrap();
///
/// assert_eq!(context.top_steps()[0].children().len(), 2);
/// context.finish().unwrap();
/// ```
#[derive(Clone, Default)]
pub struct Flow {
  context: Option<Arc<ContextState>>,
  step: Option<Arc<StepNode>>,
  frame: Option<Arc<Frame>>,
}

/// Captures the current flow's state.
pub fn fork() -> Flow {
  Flow {
    context: current_context(),
    step: current_step(),
    frame: assert_context::current_frame(),
  }
}

impl Flow {
  /// Whether a step context was active when the flow was forked.
  pub fn has_context(&self) -> bool {
    self.context.is_some()
  }

  /// Runs `f` with this flow's state installed, restoring the thread's own
  /// state afterwards.
  pub fn attach<R>(&self, f: impl FnOnce() -> R) -> R {
    let _restore = Restore {
      context: replace_context(self.context.clone()),
      step: replace_step(self.step.clone()),
      frame: assert_context::replace_frame(self.frame.clone()),
    };
    f()
  }
}

struct Restore {
  context: Option<Arc<ContextState>>,
  step: Option<Arc<StepNode>>,
  frame: Option<Arc<Frame>>,
}

impl Drop for Restore {
  fn drop(&mut self) {
    replace_context(self.context.take());
    replace_step(self.step.take());
    assert_context::replace_frame(self.frame.take());
  }
}
