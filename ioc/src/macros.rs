//! Public macros for declaring components and resolving services.

/// Builds a [`Constructor`](crate::Constructor) from a closure-like
/// parameter list.
///
/// Parameter types are the *service* types to resolve; each parameter is
/// bound as an `Arc` of that type, in declaration order.
///
/// # Examples
///
/// ```
/// use concise_ioc::{constructor, implements, Component, Constructor, Container};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {
///   fn now(&self) -> u64;
/// }
///
/// struct FixedClock;
/// impl Clock for FixedClock {
///   fn now(&self) -> u64 { 42 }
/// }
/// impl Component for FixedClock {
///   fn constructors() -> Vec<Constructor<Self>> {
///     vec![constructor!(|| FixedClock)]
///   }
/// }
/// implements!(FixedClock => dyn Clock);
///
/// struct Stamper {
///   clock: Arc<dyn Clock>,
/// }
/// impl Component for Stamper {
///   fn constructors() -> Vec<Constructor<Self>> {
///     vec![constructor!(|clock: dyn Clock| Stamper { clock })]
///   }
/// }
///
/// let container = Container::new();
/// container.register_singleton::<dyn Clock, FixedClock>();
/// container.register_transient::<Stamper, Stamper>();
/// assert_eq!(container.resolve::<Stamper>().unwrap().clock.now(), 42);
/// ```
#[macro_export]
macro_rules! constructor {
    (|| $body:expr) => {
        $crate::Constructor::new(::std::vec::Vec::new(), move |_args: &mut $crate::Arguments| {
            ::std::result::Result::Ok($body)
        })
    };

    (|$($arg:ident : $service:ty),+ $(,)?| $body:expr) => {
        $crate::Constructor::new(
            ::std::vec![$($crate::Dependency::of::<$service>()),+],
            move |args: &mut $crate::Arguments| {
                $(let $arg: ::std::sync::Arc<$service> = args.take::<$service>()?;)+
                ::std::result::Result::Ok($body)
            },
        )
    };
}

/// Declares that a component can be served for one or more trait objects.
///
/// ```
/// use concise_ioc::{constructor, implements, Component, Constructor};
///
/// trait Logger: Send + Sync {}
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {}
/// impl Component for ConsoleLogger {
///   fn constructors() -> Vec<Constructor<Self>> {
///     vec![constructor!(|| ConsoleLogger)]
///   }
/// }
/// implements!(ConsoleLogger => dyn Logger);
/// ```
#[macro_export]
macro_rules! implements {
    ($implementation:ty => $($interface:ty),+ $(,)?) => {
        $(
            impl $crate::Implements<$interface> for $implementation {
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$interface> {
                    self
                }
            }
        )+
    };
}

/// Resolves a service from the global container, or from an explicit one.
///
/// # Panics
///
/// This macro panics if the service cannot be resolved. For a non-panicking
/// version, call `resolve` on the container directly.
///
/// # Examples
///
/// ```
/// use concise_ioc::{global, resolve};
/// use std::sync::Arc;
///
/// global().register_instance::<String>(Arc::new(String::from("hello")));
///
/// let message = resolve!(String);
/// assert_eq!(*message, "hello");
/// ```
#[macro_export]
macro_rules! resolve {
    // Arm for resolving a trait object: resolve!(trait MyTrait)
    (trait $trait_ident:ident) => {
        $crate::resolve!(dyn $trait_ident)
    };

    // Arm for resolving from a specific container: resolve!(MyService, from container)
    ($type:ty, from $container:expr) => {
        $container.resolve::<$type>().unwrap_or_else(|err| {
            panic!(
                "Failed to resolve required service {}: {}",
                ::std::any::type_name::<$type>(),
                err
            )
        })
    };

    // Arm for resolving a type: resolve!(MyService) or resolve!(dyn MyTrait)
    ($type:ty) => {
        $crate::resolve!($type, from $crate::global())
    };
}
