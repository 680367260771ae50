//! The lookup-only view of a container.

use crate::component::Dependency;
use crate::core::{downcast, Service};
use crate::error::Result;
use std::any::Any;
use std::sync::Arc;

/// Fetches services by type. Implementations never expose their
/// registration tables through this trait.
pub trait ServiceProvider: Send + Sync {
  /// Resolves the service identified by `service`, type-erased.
  fn get_service(&self, service: &Dependency) -> Result<Service>;
}

impl dyn ServiceProvider + '_ {
  /// Resolves the service registered for `T`.
  pub fn get<T: ?Sized + Any + Send + Sync>(&self) -> Result<Arc<T>> {
    let service = self.get_service(&Dependency::of::<T>())?;
    downcast::<T>(&service)
  }
}
