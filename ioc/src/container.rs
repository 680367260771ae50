//! The main `Container` struct and the registration contract it fulfils.

use crate::component::{create_with_injection, Dependency, Implements};
use crate::core::{downcast, erase, Registration, ResolutionGuard, Service, ServiceFactory, ServiceKey};
use crate::error::{ResolveError, Result};
use crate::provider::ServiceProvider;
use dashmap::DashMap;
use std::any::{type_name, Any};
use std::sync::Arc;
use tracing::{debug, trace};

/// The minimal surface every container-like implementation provides.
///
/// Registration must happen before concurrent resolution begins.
pub trait IocContainer {
  /// Registers `T` for `I`; the first resolution builds it and every later
  /// resolution returns that same instance.
  fn register_singleton<I, T>(&self)
  where
    I: ?Sized + Any + Send + Sync,
    T: Implements<I>;

  /// Registers `T` for `I`; every resolution builds a fresh instance.
  fn register_transient<I, T>(&self)
  where
    I: ?Sized + Any + Send + Sync,
    T: Implements<I>;

  /// Resolves the service registered for `I`.
  fn resolve<I: ?Sized + Any + Send + Sync>(&self) -> Result<Arc<I>>;

  /// The lookup-only view of this container.
  fn provider(&self) -> &dyn ServiceProvider;
}

/// The constructor-injection container.
///
/// Holds one registration per service type (the last registration wins) and
/// builds implementations lazily on first resolution. Singleton creation is
/// guarded per registration, so concurrent first resolutions of one service
/// construct it exactly once without blocking unrelated services.
#[derive(Default)]
pub struct Container {
  registrations: DashMap<ServiceKey, Arc<Registration<Container>>>,
}

impl Container {
  /// Creates a new, empty `Container`.
  pub fn new() -> Self {
    Self::default()
  }

  // --- PRIVATE HELPERS ---

  fn insert(&self, key: ServiceKey, registration: Registration<Container>) {
    debug!(
      service = key.type_name,
      implementation = registration.implementation(),
      singleton = registration.is_singleton(),
      "registering service"
    );
    if self.registrations.insert(key, Arc::new(registration)).is_some() {
      trace!("previous registration replaced");
    }
  }

  fn injecting_factory<I, T>() -> ServiceFactory<Container>
  where
    I: ?Sized + Any + Send + Sync,
    T: Implements<I>,
  {
    Box::new(|container: &Container| {
      let instance = create_with_injection::<T>(container)?;
      Ok(erase(<T as Implements<I>>::upcast(Arc::new(instance))))
    })
  }

  fn resolve_key(&self, key: &ServiceKey) -> Result<Service> {
    let _guard = ResolutionGuard::enter(key)?;

    // Clone the registration out so no map lock is held while constructing.
    let registration = self
      .registrations
      .get(key)
      .map(|entry| Arc::clone(entry.value()))
      .ok_or(ResolveError::UnregisteredType {
        service: key.type_name,
      })?;

    trace!(
      service = key.type_name,
      implementation = registration.implementation(),
      "resolving service"
    );
    registration.service(self)
  }

  // --- PUBLIC API ---

  pub fn register_singleton<I, T>(&self)
  where
    I: ?Sized + Any + Send + Sync,
    T: Implements<I>,
  {
    self.insert(
      ServiceKey::new::<I>(),
      Registration::singleton(type_name::<T>(), Self::injecting_factory::<I, T>()),
    );
  }

  pub fn register_transient<I, T>(&self)
  where
    I: ?Sized + Any + Send + Sync,
    T: Implements<I>,
  {
    self.insert(
      ServiceKey::new::<I>(),
      Registration::transient(type_name::<T>(), Self::injecting_factory::<I, T>()),
    );
  }

  /// Registers an already-built singleton for `I`.
  pub fn register_instance<I: ?Sized + Any + Send + Sync>(&self, instance: Arc<I>) {
    self.insert(
      ServiceKey::new::<I>(),
      Registration::instance(type_name::<I>(), erase(instance)),
    );
  }

  pub fn is_registered<I: ?Sized + Any>(&self) -> bool {
    self.registrations.contains_key(&ServiceKey::new::<I>())
  }

  /// Resolves the service registered for `I`.
  pub fn resolve<I: ?Sized + Any + Send + Sync>(&self) -> Result<Arc<I>> {
    let service = self.resolve_key(&ServiceKey::new::<I>())?;
    downcast::<I>(&service)
  }

  pub fn provider(&self) -> &dyn ServiceProvider {
    self
  }
}

impl ServiceProvider for Container {
  fn get_service(&self, service: &Dependency) -> Result<Service> {
    self.resolve_key(&service.key())
  }
}

impl IocContainer for Container {
  fn register_singleton<I, T>(&self)
  where
    I: ?Sized + Any + Send + Sync,
    T: Implements<I>,
  {
    Container::register_singleton::<I, T>(self);
  }

  fn register_transient<I, T>(&self)
  where
    I: ?Sized + Any + Send + Sync,
    T: Implements<I>,
  {
    Container::register_transient::<I, T>(self);
  }

  fn resolve<I: ?Sized + Any + Send + Sync>(&self) -> Result<Arc<I>> {
    Container::resolve::<I>(self)
  }

  fn provider(&self) -> &dyn ServiceProvider {
    self
  }
}
