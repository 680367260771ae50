// ioc/tests/macros.rs

//! Tests for the declaration and resolution macros:
//! - `constructor!`
//! - `implements!`
//! - `resolve!` against the global container and explicit containers.

use concise_ioc::{constructor, global, implements, resolve, Component, Constructor, Container};
use serial_test::serial;
use std::sync::Arc;

// --- Test Fixtures ---

trait MacroTestTrait: Send + Sync {
  fn value(&self) -> i32;
}

trait SecondaryTrait: Send + Sync {
  fn label(&self) -> &'static str;
}

struct MacroTestService;
impl MacroTestTrait for MacroTestService {
  fn value(&self) -> i32 {
    42
  }
}
impl SecondaryTrait for MacroTestService {
  fn label(&self) -> &'static str {
    "secondary"
  }
}
impl Component for MacroTestService {
  fn constructors() -> Vec<Constructor<Self>> {
    vec![constructor!(|| MacroTestService)]
  }
}
implements!(MacroTestService => dyn MacroTestTrait, dyn SecondaryTrait);

struct Consumer {
  primary: Arc<dyn MacroTestTrait>,
  secondary: Arc<dyn SecondaryTrait>,
}
impl Component for Consumer {
  fn constructors() -> Vec<Constructor<Self>> {
    vec![constructor!(
      |primary: dyn MacroTestTrait, secondary: dyn SecondaryTrait,| Consumer { primary, secondary }
    )]
  }
}

struct UnregisteredService; // An unregistered type

// --- Declaration Macros ---

#[test]
fn test_constructor_macro_declares_parameters_in_order() {
  let constructors = Consumer::constructors();
  assert_eq!(constructors.len(), 1);

  let names: Vec<&str> = constructors[0]
    .parameters()
    .iter()
    .map(|p| p.type_name())
    .collect();
  assert_eq!(
    names,
    vec![
      std::any::type_name::<dyn MacroTestTrait>(),
      std::any::type_name::<dyn SecondaryTrait>(),
    ]
  );
}

#[test]
fn test_implements_macro_serves_several_traits() {
  let container = Container::new();
  container.register_singleton::<dyn MacroTestTrait, MacroTestService>();
  container.register_singleton::<dyn SecondaryTrait, MacroTestService>();
  container.register_transient::<Consumer, Consumer>();

  let consumer = container.resolve::<Consumer>().unwrap();
  assert_eq!(consumer.primary.value(), 42);
  assert_eq!(consumer.secondary.label(), "secondary");
}

// --- Resolution Macro ---

#[test]
#[serial]
fn test_resolve_global() {
  global().register_singleton::<dyn MacroTestTrait, MacroTestService>();

  assert_eq!(resolve!(dyn MacroTestTrait).value(), 42);
  assert_eq!(resolve!(trait MacroTestTrait).value(), 42);
}

#[test]
fn test_resolve_from_explicit_container() {
  let container = Container::new();
  container.register_transient::<dyn SecondaryTrait, MacroTestService>();

  assert_eq!(resolve!(dyn SecondaryTrait, from container).label(), "secondary");
}

#[test]
#[serial]
#[should_panic(expected = "Failed to resolve required service")]
fn test_resolve_panics_on_missing_concrete_service() {
  resolve!(UnregisteredService);
}

#[test]
#[should_panic(expected = "No registration exists")]
fn test_resolve_panic_carries_the_error() {
  let container = Container::new();
  resolve!(UnregisteredService, from container);
}
