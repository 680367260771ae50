use concise_steps::{continue_on_fail, step, step_within, AssertContext, StepContext, StepResult};
use std::thread;
use std::time::Duration;

fn main() {
  let context = StepContext::new();
  let _scope = AssertContext::new("checkout");

  let outcome = step("checkout", || -> StepResult {
    step("add items", || assert_eq!(2 + 2, 4))?;
    continue_on_fail("log optional metric", || -> StepResult {
      Err("metrics endpoint unavailable".into())
    })?;
    step_within("charge card", Duration::from_millis(5), || {
      thread::sleep(Duration::from_millis(15))
    })?;
    Ok(())
  });

  if let Err(err) = outcome {
    eprintln!("{}", err);
  }

  match context.finish() {
    Ok(summary) => println!("Finished: {:?}", summary),
    Err(failure) => {
      eprintln!("Test {:?} because of {:?}:", failure.kind(), failure.cause());
      eprintln!("{}", failure);
    }
  }
}
