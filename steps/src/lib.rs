//! # Concise Steps
//!
//! Records a test as a tree of named, timed steps and reports the tree when
//! the test ends.
//!
//! A [`StepContext`] owns the tree. Steps declared while it is active become
//! its top-level steps, and steps declared inside a running step become that
//! step's children. Every step records whether its action passed and how
//! long it took. When a context finishes, the tree is rendered one line per
//! step:
//!
//! ```text
//! FAIL>  checkout (0.031s)
//! PASS>  >  add items (0.004s)
//! FAIL>  >  charge card (0.027s)
//!
//! assertion `left == right` failed
//!   left: 40
//!  right: 42
//!
//!    at tests/checkout.rs:14:3
//!
//! ```
//!
//! The `at` line is where the failing step was declared, not where the
//! assertion inside its action fired.
//!
//! ## Failure modes
//!
//! - A **fail-fast** step ([`step`]) stops its flow: nested, it hands the
//!   error back to the enclosing step; top-level, it fails the test at once.
//! - A **continue-on-fail** step ([`continue_on_fail`]) records the failure
//!   and lets the flow go on. The test still fails when the context ends.
//! - A step that passes but exceeds its max duration is marked `PERF` and
//!   handled by the [`PerformanceFailurePolicy`].
//!
//! ## Example
//!
//! ```
//! use concise_steps::{continue_on_fail, step, StepContext, StepResult};
//!
//! let context = StepContext::new();
//! step("checkout", || -> StepResult {
//!   step("add items", || assert_eq!(1 + 1, 2))?;
//!   continue_on_fail("log metrics", || ())?;
//!   Ok(())
//! })
//! .unwrap();
//!
//! let summary = context.finish().unwrap();
//! println!("{:?}", summary);
//! ```
//!
//! Contexts and the current step are tracked per thread. See [`flow`] for
//! carrying them across threads.

mod adapter;
mod assert_context;
mod context;
mod error;
pub mod flow;
mod node;
mod render;
mod settings;
mod step;

pub use adapter::{bootstrap, LibtestAdapter, TestFrameworkAdapter};
pub use assert_context::AssertContext;
pub use context::{StepContext, StepContextBuilder, Summary};
pub use error::{
  ActionError, ConfigError, FailureCause, FailureKind, StepError, StepFailure, StepResult,
  TestFailure,
};
pub use flow::Flow;
pub use node::StepNode;
pub use settings::{PerformanceFailurePolicy, StepSettings};
pub use step::{continue_on_fail, continue_on_fail_within, step, step_within, Step, StepOutcome};
