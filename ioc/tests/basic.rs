use concise_ioc::{constructor, implements, Component, Constructor, Container, ResolveError};
use std::sync::Arc;

// --- Test Fixtures ---

// The trait must be Send + Sync for the container to accept it.
trait Logger: Send + Sync {
  fn name(&self) -> &'static str;
}

struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn name(&self) -> &'static str {
    "console"
  }
}
impl Component for ConsoleLogger {
  fn constructors() -> Vec<Constructor<Self>> {
    vec![constructor!(|| ConsoleLogger)]
  }
}
implements!(ConsoleLogger => dyn Logger);

struct FileLogger;
impl Logger for FileLogger {
  fn name(&self) -> &'static str {
    "file"
  }
}
impl Component for FileLogger {
  fn constructors() -> Vec<Constructor<Self>> {
    vec![constructor!(|| FileLogger)]
  }
}
implements!(FileLogger => dyn Logger);

trait Clock: Send + Sync {}

struct SystemClock;
impl Clock for SystemClock {}
impl Component for SystemClock {
  fn constructors() -> Vec<Constructor<Self>> {
    vec![constructor!(|| SystemClock)]
  }
}
implements!(SystemClock => dyn Clock);

// --- Basic Tests ---

#[test]
fn test_singleton_resolves_same_instance() {
  // Arrange
  let container = Container::new();
  container.register_singleton::<dyn Logger, ConsoleLogger>();

  // Act
  let r1 = container.resolve::<dyn Logger>().unwrap();
  let r2 = container.resolve::<dyn Logger>().unwrap();

  // Assert
  assert_eq!(r1.name(), "console");
  assert!(Arc::ptr_eq(&r1, &r2));
}

#[test]
fn test_transient_resolves_distinct_instances() {
  // Arrange
  let container = Container::new();
  container.register_transient::<dyn Clock, SystemClock>();

  // Act
  let r1 = container.resolve::<dyn Clock>().unwrap();
  let r2 = container.resolve::<dyn Clock>().unwrap();

  // Assert: two separate allocations.
  assert!(!Arc::ptr_eq(&r1, &r2));
}

#[test]
fn test_last_registration_wins() {
  let container = Container::new();
  container.register_singleton::<dyn Logger, ConsoleLogger>();
  container.register_transient::<dyn Logger, FileLogger>();

  let r1 = container.resolve::<dyn Logger>().unwrap();
  let r2 = container.resolve::<dyn Logger>().unwrap();

  assert_eq!(r1.name(), "file");
  // The second registration was a transient.
  assert!(!Arc::ptr_eq(&r1, &r2));
}

#[test]
fn test_unregistered_type_fails_regardless_of_other_registrations() {
  let container = Container::new();
  assert_eq!(
    container.resolve::<dyn Clock>().err(),
    Some(ResolveError::UnregisteredType {
      service: std::any::type_name::<dyn Clock>(),
    })
  );

  container.register_singleton::<dyn Logger, ConsoleLogger>();
  container.register_transient::<SystemClock, SystemClock>();

  assert!(matches!(
    container.resolve::<dyn Clock>(),
    Err(ResolveError::UnregisteredType { .. })
  ));
}

#[test]
fn test_concrete_type_registered_as_itself() {
  let container = Container::new();
  container.register_singleton::<ConsoleLogger, ConsoleLogger>();

  assert!(container.is_registered::<ConsoleLogger>());
  assert!(!container.is_registered::<dyn Logger>());
  assert_eq!(container.resolve::<ConsoleLogger>().unwrap().name(), "console");
}

#[test]
fn test_registered_instance_is_returned_as_is() {
  let container = Container::new();
  let logger: Arc<dyn Logger> = Arc::new(FileLogger);
  container.register_instance::<dyn Logger>(Arc::clone(&logger));

  let resolved = container.resolve::<dyn Logger>().unwrap();
  assert!(Arc::ptr_eq(&logger, &resolved));
}

#[test]
fn test_provider_facade_resolves_by_type() {
  let container = Container::new();
  container.register_singleton::<dyn Logger, ConsoleLogger>();

  let provider = container.provider();
  let via_provider = provider.get::<dyn Logger>().unwrap();
  let via_container = container.resolve::<dyn Logger>().unwrap();

  assert!(Arc::ptr_eq(&via_provider, &via_container));
  assert!(provider.get::<dyn Clock>().is_err());
}
