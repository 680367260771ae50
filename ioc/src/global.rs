//! The global container instance and access function.

use crate::container::Container;
use once_cell::sync::Lazy;

// The one and only global container instance.
// It will be created on its first access in a thread-safe manner.
static GLOBAL_CONTAINER: Lazy<Container> = Lazy::new(Container::default);

/// Provides a reference to the global container instance.
///
/// Bootstrap code registers process-wide services here; the step tracker
/// looks up its test-framework adapter in this container.
///
/// # Examples
///
/// ```
/// use concise_ioc::{constructor, global, Component, Constructor};
///
/// struct Settings;
/// impl Component for Settings {
///   fn constructors() -> Vec<Constructor<Self>> {
///     vec![constructor!(|| Settings)]
///   }
/// }
///
/// global().register_singleton::<Settings, Settings>();
/// assert!(global().resolve::<Settings>().is_ok());
/// ```
pub fn global() -> &'static Container {
  &GLOBAL_CONTAINER
}
