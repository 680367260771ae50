use concise_steps::{
  continue_on_fail, flow, step, step_within, ActionError, AssertContext, FailureCause,
  FailureKind, LibtestAdapter, PerformanceFailurePolicy, StepContext, StepFailure, StepResult,
  Summary, TestFailure, TestFrameworkAdapter,
};
use pretty_assertions::assert_eq;
use std::thread;
use std::time::Duration;

// --- Helpers ---

fn broken(message: &str) -> StepResult {
  Err(ActionError::from(message))
}

// --- Passing Trees ---

#[test]
fn test_passing_tree_is_summarized() {
  // Arrange
  let context = StepContext::new();

  // Act
  step("place order", || -> StepResult {
    step("add items", || assert_eq!(2 * 3, 6))?;
    step("apply discount", || ())?;
    Ok(())
  })
  .unwrap();

  // Assert
  let top = context.top_steps();
  assert_eq!(top.len(), 1);
  let names: Vec<String> = top[0]
    .children()
    .iter()
    .map(|c| c.description().to_string())
    .collect();
  assert_eq!(names, vec!["add items", "apply discount"]);

  match context.finish() {
    Ok(Summary::Passed(report)) => {
      assert!(report.starts_with("PASS>  place order ("));
      assert!(report.contains("PASS>  >  add items ("));
    }
    other => panic!("unexpected outcome: {:?}", other),
  }
}

#[test]
fn test_context_without_steps_reports_nothing() {
  let context = StepContext::new();
  assert_eq!(context.finish(), Ok(Summary::NoSteps));
}

// --- Fail-Fast ---

#[test]
fn test_top_level_failure_fails_immediately_with_report() {
  let context = StepContext::new();

  let result = step("compute total", || broken("total mismatch"));

  let failure = match result {
    Err(StepFailure::Test(failure)) => failure,
    other => panic!("expected a test failure, got {:?}", other),
  };
  assert_eq!(failure.kind(), FailureKind::Failed);
  assert_eq!(failure.cause(), FailureCause::StepFailed);
  assert!(failure.message().starts_with("FAIL>  compute total ("));
  assert!(failure.message().contains("total mismatch"));
  assert!(context.results_reported());

  // The failure was already reported; finishing does not report it again.
  assert_eq!(context.finish(), Ok(Summary::AlreadyReported));
}

#[test]
fn test_nested_failure_propagates_to_parent_and_is_printed_once() {
  let context = StepContext::new();
  let mut reached_second_child = false;

  let result = step("checkout", || -> StepResult {
    step("charge card", || assert_eq!(40, 42, "charged amount"))?;
    reached_second_child = true;
    step("send receipt", || ())?;
    Ok(())
  });

  let failure = result.unwrap_err().test_failure().cloned().unwrap();
  assert!(!reached_second_child);

  let report = failure.message();
  assert!(report.starts_with("FAIL>  checkout ("));
  assert!(report.contains("FAIL>  >  charge card ("));
  assert!(!report.contains("send receipt"));
  assert_eq!(report.matches("charged amount").count(), 1);

  // The shared error is attributed to the child only.
  let top = context.top_steps();
  let child = &top[0].children()[0];
  let parent_error = top[0].error().unwrap();
  let child_error = child.error().unwrap();
  assert!(std::sync::Arc::ptr_eq(&parent_error, &child_error));
  assert!(child_error.is_panic());

  assert_eq!(context.finish(), Ok(Summary::AlreadyReported));
}

#[test]
fn test_nested_step_returns_step_failure_to_caller() {
  let context = StepContext::new();

  step("outer", || -> StepResult {
    let inner = step("inner", || broken("inner broke"));
    match inner {
      Err(StepFailure::Step(error)) => assert_eq!(error.to_string(), "inner broke"),
      other => panic!("expected a step failure, got {:?}", other),
    }
    // Swallowing the failure keeps the parent's own action green.
    Ok(())
  })
  .unwrap();

  let top = context.top_steps();
  assert!(top[0].functional_passed());
  assert!(!top[0].tree_functional_passed());

  let failure = context.finish().unwrap_err();
  assert!(failure.message().contains("PASS>  outer ("));
  assert!(failure.message().contains("FAIL>  >  inner ("));
}

#[test]
fn test_fail_fast_step_needs_a_context() {
  let result = thread::spawn(|| step("orphan", || ())).join().unwrap();
  assert!(matches!(result, Err(StepFailure::MissingExecutionContext)));
}

// --- Continue-On-Fail ---

#[test]
fn test_continue_on_fail_lets_siblings_run() {
  let context = StepContext::new();

  continue_on_fail("log optional metric", || broken("metrics offline")).unwrap();
  step("read dashboard", || ()).unwrap();

  let failure = context.finish().unwrap_err();
  let lines: Vec<&str> = failure
    .message()
    .lines()
    .filter(|line| line.contains(">  "))
    .collect();
  assert_eq!(lines.len(), 2);
  assert!(lines[0].starts_with("FAIL>  log optional metric ("));
  assert!(lines[1].starts_with("PASS>  read dashboard ("));
}

#[test]
fn test_fail_fast_inside_continue_on_fail_scope_is_contained() {
  let context = StepContext::new();

  continue_on_fail("optional cleanup", || -> StepResult {
    step("remove temp files", || broken("permission denied"))?;
    Ok(())
  })
  .unwrap();

  let top = context.top_steps();
  let child = &top[0].children()[0];
  assert!(child.in_continue_on_fail_scope());
  assert!(!context.results_reported());

  let failure = context.finish().unwrap_err();
  assert!(failure.message().contains("permission denied"));
}

#[test]
fn test_continue_on_fail_without_context_installs_a_detached_one() {
  thread::spawn(|| {
    continue_on_fail("best effort", || broken("ignored")).unwrap();
    // The detached context now accepts fail-fast steps on this thread too.
    step("follow up", || ()).unwrap();
  })
  .join()
  .unwrap();
}

#[test]
#[should_panic(expected = "FAIL>  unchecked")]
fn test_dropping_a_failed_context_panics_with_the_report() {
  let _context = StepContext::new();
  continue_on_fail("unchecked", || broken("nobody looked")).unwrap();
}

// --- Performance ---

#[test]
fn test_slow_step_fails_on_performance() {
  let context = StepContext::new();

  step_within("slow query", Duration::from_millis(5), || {
    thread::sleep(Duration::from_millis(30))
  })
  .unwrap();

  let top = context.top_steps();
  assert!(top[0].functional_passed());
  assert!(!top[0].performance_passed());
  assert!(context.render().starts_with("PERF>  slow query ("));

  let failure = context.finish().unwrap_err();
  assert_eq!(failure.kind(), FailureKind::Failed);
  assert_eq!(failure.cause(), FailureCause::PerformanceThresholdExceeded);
}

#[test]
fn test_slow_step_can_be_marked_inconclusive() {
  let context = StepContext::builder()
    .performance_failure_policy(PerformanceFailurePolicy::MarkInconclusive)
    .begin();
  assert_eq!(
    context.performance_failure_policy(),
    PerformanceFailurePolicy::MarkInconclusive
  );

  step("outer", || -> StepResult {
    step_within("slow child", Duration::from_millis(1), || {
      thread::sleep(Duration::from_millis(20))
    })?;
    Ok(())
  })
  .unwrap();

  let failure = context.finish().unwrap_err();
  assert!(failure.is_inconclusive());
  assert_eq!(failure.cause(), FailureCause::PerformanceThresholdExceeded);
  assert!(failure.message().contains("PERF>  >  slow child ("));
}

#[test]
fn test_functional_failure_wins_over_performance() {
  let context = StepContext::new();
  context.set_performance_failure_policy(PerformanceFailurePolicy::MarkInconclusive);

  step_within("slow", Duration::from_millis(1), || {
    thread::sleep(Duration::from_millis(10))
  })
  .unwrap();
  continue_on_fail("broken", || broken("bad")).unwrap();

  let failure = context.finish().unwrap_err();
  assert_eq!(failure.kind(), FailureKind::Failed);
  assert_eq!(failure.cause(), FailureCause::StepFailed);
}

// --- Rendering ---

#[test]
fn test_render_is_idempotent() {
  let context = StepContext::new();
  continue_on_fail("first", || broken("once")).unwrap();
  step("second", || ()).unwrap();

  let first = context.render();
  let second = context.render();
  assert_eq!(first, second);
  assert!(!context.results_reported());

  context.finish().unwrap_err();
}

#[test]
fn test_assert_context_prefixes_the_report() {
  let context = StepContext::new();
  let _scope = AssertContext::new("checkout");

  let failure = step("pay", || assert!(1 > 2)).unwrap_err();

  let message = failure.test_failure().unwrap().message().to_string();
  assert!(message.starts_with("Within checkout: FAIL>  pay ("));
  assert!(message.contains("assertion failed: 1 > 2"));

  assert_eq!(context.finish(), Ok(Summary::AlreadyReported));
}

// --- Nesting Contexts ---

#[test]
fn test_inner_context_restores_outer_context() {
  let outer = StepContext::new();
  step("outer before", || ()).unwrap();

  {
    let inner = StepContext::new();
    step("inner only", || ()).unwrap();
    assert_eq!(inner.top_steps().len(), 1);
    inner.finish().unwrap();
  }

  step("outer after", || ()).unwrap();
  let names: Vec<String> = outer
    .top_steps()
    .iter()
    .map(|s| s.description().to_string())
    .collect();
  assert_eq!(names, vec!["outer before", "outer after"]);
  outer.finish().unwrap();
}

// --- Concurrency ---

#[test]
fn test_forked_flows_nest_under_the_forking_step() {
  let context = StepContext::new();

  step("fan out", || -> StepResult {
    let flow = flow::fork();
    assert!(flow.has_context());
    thread::scope(|s| {
      for worker in 0..4 {
        let flow = flow.clone();
        s.spawn(move || {
          flow.attach(|| {
            if worker == 2 {
              continue_on_fail(format!("worker {worker}"), || broken("shard offline"))
            } else {
              step(format!("worker {worker}"), || ())
            }
          })
        });
      }
    });
    Ok(())
  })
  .unwrap();

  let top = context.top_steps();
  assert_eq!(top.len(), 1);
  assert_eq!(top[0].children().len(), 4);

  let failure = context.finish().unwrap_err();
  assert!(failure.message().contains("FAIL>  >  worker 2 ("));
  assert!(failure.message().contains("PASS>  >  worker 0 ("));
}

#[test]
fn test_unattached_threads_do_not_see_the_context() {
  let context = StepContext::new();

  step("spawn", || -> StepResult {
    let result = thread::spawn(|| step("lost", || ())).join().unwrap();
    assert!(matches!(result, Err(StepFailure::MissingExecutionContext)));
    Ok(())
  })
  .unwrap();

  assert!(context.top_steps()[0].children().is_empty());
  context.finish().unwrap();
}

#[test]
fn test_actions_may_return_their_own_errors() {
  #[derive(Debug, thiserror::Error)]
  #[error("inventory unavailable")]
  struct InventoryError;

  let context = StepContext::new();
  let result = step("reserve stock", || -> Result<(), InventoryError> { Err(InventoryError) });

  assert!(result.is_err());
  let error = context.top_steps()[0].error().unwrap();
  assert!(error.downcast_ref::<InventoryError>().is_some());
  assert_eq!(context.finish(), Ok(Summary::AlreadyReported));
}

#[test]
fn test_nested_context_failure_is_reported_as_an_assertion() {
  let context = StepContext::new();

  let result = step("outer", || -> StepResult {
    let inner = StepContext::new();
    let inner_result = step("inner check", || assert_eq!(1, 2));
    inner.finish()?;
    inner_result?;
    Ok(())
  });
  assert!(result.is_err());

  let error = context.top_steps()[0].error().unwrap();
  assert!(error.downcast_ref::<TestFailure>().is_some());
  assert!(error.downcast_ref::<StepFailure>().is_none());
  assert!(LibtestAdapter.is_assertion_error(&error));

  let report = context.render();
  assert!(report.starts_with("FAIL>  outer ("));
  assert!(report.contains("FAIL>  inner check ("));
  assert!(!report.contains("caused by"));
  assert_eq!(context.finish(), Ok(Summary::AlreadyReported));
}

#[test]
fn test_custom_assert_message_is_reported_as_unexpected_error() {
  let context = StepContext::new();
  let total = 2;

  continue_on_fail("check totals", || assert!(total > 3, "totals differ")).unwrap();

  let error = context.top_steps()[0].error().unwrap();
  assert!(!LibtestAdapter.is_assertion_error(&error));
  // No blank line between the message and the location.
  assert!(context.render().contains("\ntotals differ\n   at "));
  context.finish().unwrap_err();
}

#[test]
fn test_error_location_is_the_step_declaration() {
  let context = StepContext::new();

  let declared_on = line!() + 1;
  continue_on_fail("misplaced", || broken("wrong shelf")).unwrap();

  let expected = format!("   at {}:{}:", file!(), declared_on);
  assert!(context.render().contains(&expected));
  context.finish().unwrap_err();
}
