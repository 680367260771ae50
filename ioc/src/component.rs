//! Constructor declarations for injectable types.
//!
//! Rust has no runtime reflection over constructors, so an injectable type
//! describes its own public constructors by implementing [`Component`]. The
//! container then runs the same algorithm a reflective container would: pick
//! the single constructor, resolve each parameter depth-first and
//! left-to-right, and build the instance from the resolved arguments.

use crate::core::{downcast, Service, ServiceKey};
use crate::error::{ResolveError, Result};
use crate::provider::ServiceProvider;
use std::any::{type_name, Any, TypeId};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// The identity of a requested service type.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dependency {
  type_id: TypeId,
  type_name: &'static str,
}

impl Dependency {
  pub fn of<T: ?Sized + Any>() -> Self {
    Self {
      type_id: TypeId::of::<T>(),
      type_name: type_name::<T>(),
    }
  }

  pub fn type_id(&self) -> TypeId {
    self.type_id
  }

  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  pub(crate) fn key(&self) -> ServiceKey {
    ServiceKey::from_parts(self.type_id, self.type_name)
  }
}

impl fmt::Debug for Dependency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Dependency({})", self.type_name)
  }
}

/// Resolved constructor arguments, consumed in declaration order.
pub struct Arguments {
  values: VecDeque<(Dependency, Service)>,
}

impl Arguments {
  fn with_capacity(capacity: usize) -> Self {
    Self {
      values: VecDeque::with_capacity(capacity),
    }
  }

  fn push(&mut self, dependency: Dependency, service: Service) {
    self.values.push_back((dependency, service));
  }

  /// Takes the next argument, which must have been declared as `T`.
  pub fn take<T: ?Sized + Any + Send + Sync>(&mut self) -> Result<Arc<T>> {
    let expected = Dependency::of::<T>();
    match self.values.pop_front() {
      Some((dependency, service)) if dependency == expected => downcast::<T>(&service),
      Some((dependency, _)) => Err(ResolveError::ArgumentMismatch {
        expected: expected.type_name,
        found: dependency.type_name,
      }),
      None => Err(ResolveError::ArgumentMismatch {
        expected: expected.type_name,
        found: "<no argument>",
      }),
    }
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

type BuildFn<T> = Box<dyn Fn(&mut Arguments) -> Result<T> + Send + Sync>;

/// One public constructor of `T`: its parameter types and how to build `T`
/// once those parameters have been resolved.
///
/// Usually written with the [`constructor!`](crate::constructor) macro.
pub struct Constructor<T> {
  parameters: Vec<Dependency>,
  build: BuildFn<T>,
}

impl<T> Constructor<T> {
  pub fn new(
    parameters: Vec<Dependency>,
    build: impl Fn(&mut Arguments) -> Result<T> + Send + Sync + 'static,
  ) -> Self {
    Self {
      parameters,
      build: Box::new(build),
    }
  }

  pub fn parameters(&self) -> &[Dependency] {
    &self.parameters
  }
}

/// A type the container can build by constructor injection.
pub trait Component: Any + Send + Sync + Sized {
  /// The public constructors of this type. Exactly one is supported.
  fn constructors() -> Vec<Constructor<Self>>;
}

/// Declares that `Self` can be served wherever `I` is requested.
///
/// Every component implements itself; trait-object relations are declared
/// with [`implements!`](crate::implements).
pub trait Implements<I: ?Sized + Any + Send + Sync>: Component {
  fn upcast(self: Arc<Self>) -> Arc<I>;
}

impl<T: Component> Implements<T> for T {
  fn upcast(self: Arc<Self>) -> Arc<T> {
    self
  }
}

/// Builds `T` through its single public constructor, resolving every
/// parameter from `provider` depth-first, left-to-right.
pub fn create_with_injection<T: Component>(provider: &dyn ServiceProvider) -> Result<T> {
  let implementation = type_name::<T>();
  let mut constructors = T::constructors();
  let constructor = match constructors.len() {
    0 => return Err(ResolveError::NoConstructor { implementation }),
    1 => constructors.remove(0),
    count => {
      return Err(ResolveError::AmbiguousConstructor {
        implementation,
        count,
      })
    }
  };

  let mut arguments = Arguments::with_capacity(constructor.parameters.len());
  for dependency in &constructor.parameters {
    tracing::trace!(
      implementation,
      parameter = dependency.type_name,
      "resolving constructor argument"
    );
    arguments.push(*dependency, provider.get_service(dependency)?);
  }

  (constructor.build)(&mut arguments)
}
