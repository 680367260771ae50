use thiserror::Error;

/// Errors raised while resolving a service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
  /// No registration exists for the requested service type.
  #[error("No registration exists for {service}")]
  UnregisteredType { service: &'static str },

  /// The implementation type declares no public constructor.
  #[error("No public constructor exists for type {implementation}")]
  NoConstructor { implementation: &'static str },

  /// The implementation type declares more than one public constructor.
  #[error("Multiple constructors ({count}) are not supported on type {implementation}")]
  AmbiguousConstructor {
    implementation: &'static str,
    count: usize,
  },

  /// The service is already being resolved further up the current call chain.
  #[error("Circular dependency detected while resolving {service}")]
  CircularDependency { service: &'static str },

  /// A constructor asked for an argument it did not declare, or in a different order.
  #[error("Constructor argument mismatch: expected {expected}, found {found}")]
  ArgumentMismatch {
    expected: &'static str,
    found: &'static str,
  },

  /// A stored service could not be handed out as the requested type.
  #[error("Registered service could not be converted to {service}")]
  ServiceMismatch { service: &'static str },
}

/// Errors raised when wrapping a foreign container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
  /// The wrapped object is not a container this adapter recognizes.
  #[error("The argument is not of type {expected}")]
  UnrecognizedContainer { expected: &'static str },
}

/// A specialized `Result` type for `concise_ioc` operations.
pub type Result<T, E = ResolveError> = std::result::Result<T, E>;
