use concise_ioc::{constructor, global, implements, resolve, Component, Constructor};
use std::sync::Arc;

// 1. Define the abstraction (the trait)
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

// 2. Define a concrete implementation and its constructor
struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE LOG]: {}", message);
  }
}
impl Component for ConsoleLogger {
  fn constructors() -> Vec<Constructor<Self>> {
    vec![constructor!(|| ConsoleLogger)]
  }
}
implements!(ConsoleLogger => dyn Logger);

// 3. Define a service that depends on the abstraction
struct ReportService {
  logger: Arc<dyn Logger>,
}
impl Component for ReportService {
  fn constructors() -> Vec<Constructor<Self>> {
    vec![constructor!(|logger: dyn Logger| ReportService { logger })]
  }
}

impl ReportService {
  fn generate_report(&self) {
    self.logger.log("Starting report generation.");
    self.logger.log("Finished report generation.");
  }
}

fn main() {
  // --- Registration ---
  global().register_singleton::<dyn Logger, ConsoleLogger>();
  global().register_transient::<ReportService, ReportService>();

  // --- Resolution and Usage ---
  // The container builds ReportService by resolving its constructor argument first.
  println!("Resolving the high-level service...");
  let report_service = resolve!(ReportService);
  report_service.generate_report();
}
