//! Plain-text rendering of a step tree.
//!
//! Each step is one line: a status (`PASS`, `PERF` or `FAIL`), one `>  `
//! marker per nesting level, the description and the elapsed seconds. An
//! error is printed under the deepest step that recorded it; ancestors that
//! only carry the same error forward do not repeat it. The `at` line of an
//! error block is the step's declaration site.

use crate::adapter::TestFrameworkAdapter;
use crate::error::StepError;
use crate::node::StepNode;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

pub(crate) struct Rendering<'a> {
  steps: &'a [Arc<StepNode>],
  adapter: &'a dyn TestFrameworkAdapter,
}

impl<'a> Rendering<'a> {
  pub(crate) fn new(steps: &'a [Arc<StepNode>], adapter: &'a dyn TestFrameworkAdapter) -> Self {
    Self { steps, adapter }
  }

  fn write_steps(&self, f: &mut fmt::Formatter<'_>, steps: &[Arc<StepNode>], level: usize) -> fmt::Result {
    for step in steps {
      writeln!(
        f,
        "{}{}{} ({:.3}s)",
        status(step),
        ">  ".repeat(level + 1),
        step.description(),
        step.duration().as_secs_f64()
      )?;

      let children = step.children();
      if let Some(error) = step.error() {
        if !raised_by_child(&children, &error) {
          self.write_error(f, step, &error)?;
        }
      }
      if !children.is_empty() {
        self.write_steps(f, &children, level + 1)?;
      }
    }
    Ok(())
  }

  fn write_error(&self, f: &mut fmt::Formatter<'_>, step: &StepNode, error: &StepError) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{}", error)?;
    if self.adapter.is_assertion_error(error) {
      writeln!(f)?;
    } else {
      let mut source = error.source();
      while let Some(cause) = source {
        writeln!(f, "caused by: {}", cause)?;
        source = cause.source();
      }
    }
    writeln!(f, "   at {}", step.location())?;
    writeln!(f)
  }
}

impl fmt::Display for Rendering<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.write_steps(f, self.steps, 0)
  }
}

fn status(step: &StepNode) -> &'static str {
  match (step.functional_passed(), step.performance_passed()) {
    (true, true) => "PASS",
    (true, false) => "PERF",
    (false, _) => "FAIL",
  }
}

fn raised_by_child(children: &[Arc<StepNode>], error: &Arc<StepError>) -> bool {
  children
    .iter()
    .any(|child| child.error().is_some_and(|e| Arc::ptr_eq(&e, error)))
}
