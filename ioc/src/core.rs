//! Core, non-public data structures shared by the containers.

use crate::error::{ResolveError, Result};
use once_cell::sync::OnceCell;
use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A type-erased service handle. The payload is always an `Arc<I>` for the
/// service type `I` it was registered under.
pub type Service = Arc<dyn Any + Send + Sync>;

thread_local! {
  // The set of services currently being resolved on this thread. A key that
  // is already present means the dependency graph loops back on itself.
  static RESOLVING_STACK: RefCell<HashSet<ServiceKey>> = RefCell::new(HashSet::new());
}

/// An RAII guard that marks a service as "being resolved" on this thread.
///
/// Entering a key that is already on the stack fails with
/// [`ResolveError::CircularDependency`]. Dropping the guard pops the key.
pub(crate) struct ResolutionGuard {
  key: ServiceKey,
}

impl ResolutionGuard {
  pub(crate) fn enter(key: &ServiceKey) -> Result<Self> {
    let inserted = RESOLVING_STACK.with(|stack| stack.borrow_mut().insert(key.clone()));
    if !inserted {
      tracing::warn!(service = key.type_name, "circular dependency detected");
      return Err(ResolveError::CircularDependency {
        service: key.type_name,
      });
    }
    Ok(Self { key: key.clone() })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      stack.borrow_mut().remove(&self.key);
    });
  }
}

/// Identity of a registration: the service type plus an optional name.
#[derive(Clone)]
pub(crate) struct ServiceKey {
  pub(crate) type_id: TypeId,
  pub(crate) type_name: &'static str,
  pub(crate) name: Option<String>,
}

impl ServiceKey {
  pub(crate) fn new<T: ?Sized + Any>() -> Self {
    Self::from_parts(TypeId::of::<T>(), type_name::<T>())
  }

  pub(crate) fn new_with_name<T: ?Sized + Any>(name: &str) -> Self {
    Self {
      name: Some(name.to_owned()),
      ..Self::new::<T>()
    }
  }

  pub(crate) fn from_parts(type_id: TypeId, type_name: &'static str) -> Self {
    Self {
      type_id,
      type_name,
      name: None,
    }
  }
}

impl PartialEq for ServiceKey {
  fn eq(&self, other: &Self) -> bool {
    self.type_id == other.type_id && self.name == other.name
  }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.type_id.hash(state);
    self.name.hash(state);
  }
}

impl fmt::Debug for ServiceKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.name {
      Some(name) => write!(f, "Key({}, Name({}))", self.type_name, name),
      None => write!(f, "Key({})", self.type_name),
    }
  }
}

pub(crate) fn erase<I: ?Sized + Any + Send + Sync>(service: Arc<I>) -> Service {
  Arc::new(service)
}

pub(crate) fn downcast<I: ?Sized + Any + Send + Sync>(service: &Service) -> Result<Arc<I>> {
  service
    .downcast_ref::<Arc<I>>()
    .cloned()
    .ok_or(ResolveError::ServiceMismatch {
      service: type_name::<I>(),
    })
}

pub(crate) type ServiceFactory<C> = Box<dyn Fn(&C) -> Result<Service> + Send + Sync>;

/// One registration. `C` is the owning container, handed back to the
/// factory so it can resolve constructor arguments.
pub(crate) enum Registration<C: ?Sized> {
  Singleton {
    implementation: &'static str,
    cell: OnceCell<Service>,
    factory: ServiceFactory<C>,
  },
  Transient {
    implementation: &'static str,
    factory: ServiceFactory<C>,
  },
}

impl<C: ?Sized + 'static> Registration<C> {
  pub(crate) fn singleton(implementation: &'static str, factory: ServiceFactory<C>) -> Self {
    Registration::Singleton {
      implementation,
      cell: OnceCell::new(),
      factory,
    }
  }

  pub(crate) fn transient(implementation: &'static str, factory: ServiceFactory<C>) -> Self {
    Registration::Transient {
      implementation,
      factory,
    }
  }

  /// A singleton whose instance already exists.
  pub(crate) fn instance(implementation: &'static str, service: Service) -> Self {
    let stored = Arc::clone(&service);
    Registration::Singleton {
      implementation,
      cell: OnceCell::with_value(service),
      factory: Box::new(move |_: &C| Ok(Arc::clone(&stored))),
    }
  }

  pub(crate) fn implementation(&self) -> &'static str {
    match self {
      Registration::Singleton { implementation, .. }
      | Registration::Transient { implementation, .. } => implementation,
    }
  }

  pub(crate) fn is_singleton(&self) -> bool {
    matches!(self, Registration::Singleton { .. })
  }

  /// Returns the cached singleton, creating it at most once, or a fresh transient.
  pub(crate) fn service(&self, owner: &C) -> Result<Service> {
    match self {
      Registration::Singleton { cell, factory, .. } => {
        cell.get_or_try_init(|| factory(owner)).map(Arc::clone)
      }
      Registration::Transient { factory, .. } => factory(owner),
    }
  }
}
