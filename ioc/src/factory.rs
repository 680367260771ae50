//! A closure-driven service registry with optional service names.
//!
//! Where [`Container`](crate::Container) builds types from their declared
//! constructors, `FactoryRegistry` runs whatever factory it was handed. It is
//! the container model [`RegistryAdapter`](crate::RegistryAdapter) wraps.

use crate::component::Dependency;
use crate::core::{downcast, erase, Registration, ResolutionGuard, Service, ServiceFactory, ServiceKey};
use crate::error::{ResolveError, Result};
use crate::provider::ServiceProvider;
use dashmap::DashMap;
use std::any::{type_name, Any};
use std::sync::Arc;

/// A thread-safe registry of service factories, keyed by type and name.
#[derive(Default)]
pub struct FactoryRegistry {
  entries: DashMap<ServiceKey, Arc<Registration<FactoryRegistry>>>,
}

impl FactoryRegistry {
  /// Creates a new, empty `FactoryRegistry`.
  pub fn new() -> Self {
    Self::default()
  }

  // --- PRIVATE HELPERS ---

  fn key<T: ?Sized + Any>(name: Option<&str>) -> ServiceKey {
    match name {
      Some(n) => ServiceKey::new_with_name::<T>(n),
      None => ServiceKey::new::<T>(),
    }
  }

  fn insert(&self, key: ServiceKey, registration: Registration<FactoryRegistry>) {
    tracing::debug!(
      service = key.type_name,
      name = key.name.as_deref(),
      singleton = registration.is_singleton(),
      "registering factory"
    );
    self.entries.insert(key, Arc::new(registration));
  }

  fn add_instance_internal<T: Any + Send + Sync>(&self, name: Option<&str>, instance: T) {
    self.insert(
      Self::key::<T>(name),
      Registration::instance(type_name::<T>(), erase(Arc::new(instance))),
    );
  }

  fn add_internal<T: Any + Send + Sync>(
    &self,
    name: Option<&str>,
    singleton: bool,
    factory: impl Fn(&FactoryRegistry) -> Result<T> + Send + Sync + 'static,
  ) {
    let factory: ServiceFactory<FactoryRegistry> =
      Box::new(move |registry: &FactoryRegistry| Ok(erase(Arc::new(factory(registry)?))));
    let registration = if singleton {
      Registration::singleton(type_name::<T>(), factory)
    } else {
      Registration::transient(type_name::<T>(), factory)
    };
    self.insert(Self::key::<T>(name), registration);
  }

  fn add_trait_internal<I: ?Sized + Any + Send + Sync>(
    &self,
    name: Option<&str>,
    singleton: bool,
    factory: impl Fn(&FactoryRegistry) -> Result<Arc<I>> + Send + Sync + 'static,
  ) {
    let factory: ServiceFactory<FactoryRegistry> =
      Box::new(move |registry: &FactoryRegistry| Ok(erase(factory(registry)?)));
    let registration = if singleton {
      Registration::singleton(type_name::<I>(), factory)
    } else {
      Registration::transient(type_name::<I>(), factory)
    };
    self.insert(Self::key::<I>(name), registration);
  }

  fn get_key(&self, key: &ServiceKey) -> Result<Service> {
    let _guard = ResolutionGuard::enter(key)?;
    let registration = self
      .entries
      .get(key)
      .map(|entry| Arc::clone(entry.value()))
      .ok_or(ResolveError::UnregisteredType {
        service: key.type_name,
      })?;
    registration.service(self)
  }

  // --- PUBLIC API ---

  // --- Instance Registration ---
  pub fn add_instance<T: Any + Send + Sync>(&self, instance: T) {
    self.add_instance_internal(None, instance);
  }
  pub fn add_instance_with_name<T: Any + Send + Sync>(&self, name: &str, instance: T) {
    self.add_instance_internal(Some(name), instance);
  }

  // --- Singleton Registration ---
  pub fn add_singleton<T: Any + Send + Sync>(
    &self,
    factory: impl Fn(&FactoryRegistry) -> Result<T> + Send + Sync + 'static,
  ) {
    self.add_internal(None, true, factory);
  }
  pub fn add_singleton_with_name<T: Any + Send + Sync>(
    &self,
    name: &str,
    factory: impl Fn(&FactoryRegistry) -> Result<T> + Send + Sync + 'static,
  ) {
    self.add_internal(Some(name), true, factory);
  }

  // --- Transient Registration ---
  pub fn add_transient<T: Any + Send + Sync>(
    &self,
    factory: impl Fn(&FactoryRegistry) -> Result<T> + Send + Sync + 'static,
  ) {
    self.add_internal(None, false, factory);
  }
  pub fn add_transient_with_name<T: Any + Send + Sync>(
    &self,
    name: &str,
    factory: impl Fn(&FactoryRegistry) -> Result<T> + Send + Sync + 'static,
  ) {
    self.add_internal(Some(name), false, factory);
  }

  // --- Trait Registration ---
  pub fn add_singleton_trait<I: ?Sized + Any + Send + Sync>(
    &self,
    factory: impl Fn(&FactoryRegistry) -> Result<Arc<I>> + Send + Sync + 'static,
  ) {
    self.add_trait_internal(None, true, factory);
  }
  pub fn add_singleton_trait_with_name<I: ?Sized + Any + Send + Sync>(
    &self,
    name: &str,
    factory: impl Fn(&FactoryRegistry) -> Result<Arc<I>> + Send + Sync + 'static,
  ) {
    self.add_trait_internal(Some(name), true, factory);
  }
  pub fn add_transient_trait<I: ?Sized + Any + Send + Sync>(
    &self,
    factory: impl Fn(&FactoryRegistry) -> Result<Arc<I>> + Send + Sync + 'static,
  ) {
    self.add_trait_internal(None, false, factory);
  }

  // --- Resolution ---
  /// Resolves a service, optionally by name.
  pub fn get<T: ?Sized + Any + Send + Sync>(&self, name: Option<&str>) -> Result<Arc<T>> {
    let service = self.get_key(&Self::key::<T>(name))?;
    downcast::<T>(&service)
  }

  pub fn contains<T: ?Sized + Any>(&self, name: Option<&str>) -> bool {
    self.entries.contains_key(&Self::key::<T>(name))
  }
}

impl ServiceProvider for FactoryRegistry {
  fn get_service(&self, service: &Dependency) -> Result<Service> {
    self.get_key(&service.key())
  }
}
