//! Nested naming scopes that prefix assertion messages with a breadcrumb.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

#[derive(Debug)]
pub(crate) struct Frame {
  name: String,
  parent: Option<Arc<Frame>>,
}

impl Frame {
  fn names(&self) -> Vec<String> {
    let mut names = Vec::new();
    let mut current = Some(self);
    while let Some(frame) = current {
      if !frame.name.is_empty() {
        names.push(frame.name.clone());
      }
      current = frame.parent.as_deref();
    }
    names.reverse();
    names
  }
}

thread_local! {
  static CURRENT_FRAME: RefCell<Option<Arc<Frame>>> = RefCell::new(None);
}

pub(crate) fn current_frame() -> Option<Arc<Frame>> {
  CURRENT_FRAME.with(|current| current.borrow().clone())
}

/// Installs `frame` as the current scope and returns the one it replaced.
pub(crate) fn replace_frame(frame: Option<Arc<Frame>>) -> Option<Arc<Frame>> {
  CURRENT_FRAME.with(|current| current.replace(frame))
}

/// A named scope. While the guard lives, every assertion failure created by
/// the test adapter on this flow is prefixed with `Within a > b > c: `.
///
/// ```
/// use concise_steps::AssertContext;
///
/// let _outer = AssertContext::new("checkout");
/// let inner = AssertContext::new("payment");
/// assert_eq!(inner.full_context(), "Within checkout > payment: ");
/// ```
pub struct AssertContext {
  frame: Arc<Frame>,
  // Scopes are tied to the flow that opened them.
  _not_send: PhantomData<*const ()>,
}

impl AssertContext {
  pub fn new(name: impl Into<String>) -> Self {
    let frame = Arc::new(Frame {
      name: name.into(),
      parent: current_frame(),
    });
    replace_frame(Some(Arc::clone(&frame)));
    Self {
      frame,
      _not_send: PhantomData,
    }
  }

  pub fn name(&self) -> &str {
    &self.frame.name
  }

  pub fn parent_name(&self) -> Option<&str> {
    self.frame.parent.as_deref().map(|parent| parent.name.as_str())
  }

  /// Non-empty scope names from the outermost to this one.
  pub fn full_context_list(&self) -> Vec<String> {
    self.frame.names()
  }

  pub fn full_context(&self) -> String {
    format_context(&self.frame.names())
  }

  /// The breadcrumb of the innermost scope on this flow, or an empty string.
  pub fn current_full_context() -> String {
    current_frame()
      .map(|frame| format_context(&frame.names()))
      .unwrap_or_default()
  }

  /// Prefixes `message` with the current breadcrumb.
  pub fn decorate(message: &str) -> String {
    let mut decorated = Self::current_full_context();
    decorated.push_str(message);
    decorated
  }
}

impl Drop for AssertContext {
  fn drop(&mut self) {
    replace_frame(self.frame.parent.clone());
  }
}

fn format_context(names: &[String]) -> String {
  if names.is_empty() {
    return String::new();
  }
  format!("Within {}: ", names.join(" > "))
}
