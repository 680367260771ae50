//! Serves the [`IocContainer`] contract from a wrapped [`FactoryRegistry`].

use crate::component::{create_with_injection, Implements};
use crate::container::IocContainer;
use crate::error::{AdapterError, Result};
use crate::factory::FactoryRegistry;
use crate::provider::ServiceProvider;
use std::any::{type_name, Any};
use std::sync::Arc;

/// Adapts a [`FactoryRegistry`] to the registration API of [`Container`](crate::Container).
///
/// Registrations made through the adapter land in the wrapped registry as
/// factories that run constructor injection against that same registry, so
/// code holding the registry directly sees them too.
pub struct RegistryAdapter {
  registry: Arc<FactoryRegistry>,
}

impl RegistryAdapter {
  /// Wraps `container`, which must be a [`FactoryRegistry`].
  pub fn create(container: Arc<dyn Any + Send + Sync>) -> Result<Self, AdapterError> {
    let registry = container
      .downcast::<FactoryRegistry>()
      .map_err(|_| AdapterError::UnrecognizedContainer {
        expected: type_name::<FactoryRegistry>(),
      })?;
    tracing::debug!("wrapped factory registry");
    Ok(Self { registry })
  }

  pub fn registry(&self) -> &FactoryRegistry {
    &self.registry
  }
}

impl IocContainer for RegistryAdapter {
  fn register_singleton<I, T>(&self)
  where
    I: ?Sized + Any + Send + Sync,
    T: Implements<I>,
  {
    self.registry.add_singleton_trait::<I>(|registry| {
      let instance = create_with_injection::<T>(registry)?;
      Ok(<T as Implements<I>>::upcast(Arc::new(instance)))
    });
  }

  fn register_transient<I, T>(&self)
  where
    I: ?Sized + Any + Send + Sync,
    T: Implements<I>,
  {
    self.registry.add_transient_trait::<I>(|registry| {
      let instance = create_with_injection::<T>(registry)?;
      Ok(<T as Implements<I>>::upcast(Arc::new(instance)))
    });
  }

  fn resolve<I: ?Sized + Any + Send + Sync>(&self) -> Result<Arc<I>> {
    self.registry.get::<I>(None)
  }

  fn provider(&self) -> &dyn ServiceProvider {
    &*self.registry
  }
}
