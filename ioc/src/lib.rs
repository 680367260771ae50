//! # Concise IoC
//!
//! A small, thread-safe constructor-injection container for test suites.
//!
//! Types are registered against the service they provide, either as a
//! singleton (built once, on first resolution) or as a transient (built on
//! every resolution). Resolution walks the implementation's single declared
//! constructor, resolving each parameter from the container first.
//!
//! ## Core Concepts
//!
//! - **Component**: a type that declares its public constructor(s). Exactly
//!   one is supported; zero or several fail resolution.
//! - **Container**: the registration table plus the resolution algorithm.
//! - **ServiceProvider**: the lookup-only view handed to code that must not
//!   register anything.
//! - **Global Container**: a static container, accessible via `global()`.
//!
//! ## Quick Start
//!
//! ```
//! use concise_ioc::{constructor, implements, Component, Constructor, Container};
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, message: &str) -> String;
//! }
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) -> String {
//!         format!("[console] {}", message)
//!     }
//! }
//! impl Component for ConsoleLogger {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![constructor!(|| ConsoleLogger)]
//!     }
//! }
//! implements!(ConsoleLogger => dyn Logger);
//!
//! struct ReportService {
//!     logger: Arc<dyn Logger>,
//! }
//! impl Component for ReportService {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![constructor!(|logger: dyn Logger| ReportService { logger })]
//!     }
//! }
//!
//! let container = Container::new();
//! container.register_singleton::<dyn Logger, ConsoleLogger>();
//! container.register_transient::<ReportService, ReportService>();
//!
//! let service = container.resolve::<ReportService>().unwrap();
//! assert_eq!(service.logger.log("ready"), "[console] ready");
//! ```
//!
//! ## Limitations
//!
//! Registration is not synchronized against concurrent resolution: register
//! everything first. A dependency cycle fails with
//! [`ResolveError::CircularDependency`] instead of recursing forever.

mod adapter;
mod component;
mod container;
mod core;
mod error;
mod factory;
mod global;
mod macros;
mod provider;

pub use adapter::RegistryAdapter;
pub use component::{create_with_injection, Arguments, Component, Constructor, Dependency, Implements};
pub use container::{Container, IocContainer};
pub use core::Service;
pub use error::{AdapterError, ResolveError, Result};
pub use factory::FactoryRegistry;
pub use global::global;
pub use provider::ServiceProvider;
