//! Macros for declaring factory registries and registering into them.
//!
//! [`define_registry!`](crate::define_registry) and
//! [`define_typed_registry!`](crate::define_typed_registry) generate a module
//! holding the registry's lazily created singleton, its type aliases and free
//! functions. [`register_creator!`](crate::register_creator) and
//! [`register_class!`](crate::register_class) submit a link-time registration
//! that the registry picks up the first time it is accessed, so no central
//! list of implementations is needed and the order in which crates and
//! modules are linked does not matter.

/// Declares a factory registry keyed by an arbitrary key type.
///
/// ```text
/// define_typed_registry!(VIS NAME<KEY>: dyn TRAIT);
/// define_typed_registry!(VIS NAME<KEY>: dyn TRAIT, (ARG, ...));
/// ```
///
/// The macro generates a module `NAME` containing:
/// - Aliases `Key`, `Interface` (`dyn TRAIT`), `Args` (the argument tuple),
///   `Creator`, `Registry` and `Registerer`
/// - `Registration`, the link-time entry submitted by `register_creator!` and
///   `register_class!`
/// - `registry()`, which returns the one shared [`Registry`](crate::Registry).
///   It is created on first use and immediately filled with every submitted
///   `Registration`
/// - Free functions `register`, `try_register`, `has`, `create`, `keys`,
///   `registered_keys`, `set_trace_callback`, `clear_trace_callback` and
///   `default_creator`
///
/// The module does `use super::*`, so `TRAIT`, `KEY` and the argument types
/// resolve as they do where the macro is invoked. Invoke it at module level.
///
/// # Examples
///
/// ```rust
/// use factory_registry::{define_typed_registry, register_creator};
///
/// pub trait Opcode {
///     fn mnemonic(&self) -> &'static str;
/// }
///
/// struct Nop;
/// impl Opcode for Nop {
///     fn mnemonic(&self) -> &'static str {
///         "nop"
///     }
/// }
///
/// define_typed_registry!(pub opcodes<u8>: dyn Opcode);
///
/// register_creator!(opcodes, 0x90u8, |()| Box::new(Nop));
///
/// fn main() {
///     assert!(opcodes::has(&0x90));
///     assert_eq!(opcodes::create(&0x90, ()).unwrap().mnemonic(), "nop");
///     assert!(opcodes::create(&0x00, ()).is_err());
/// }
/// ```
#[macro_export]
macro_rules! define_typed_registry {
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident < $key:ty > : dyn $iface:path $(, ($($arg:ty),* $(,)?))?
    ) => {
        $(#[$meta])*
        $vis mod $name {
            #[allow(unused_imports)]
            use super::*;

            /// Key type of this registry.
            pub type Key = $key;
            /// Interface every registered implementation is created as.
            pub type Interface = dyn $iface;
            /// Argument tuple passed to every creator.
            pub type Args = ($($($arg,)*)?);
            pub type Creator = $crate::Creator<Interface, Args>;
            pub type Registry = $crate::Registry<Key, Interface, Args>;
            pub type Registerer = $crate::Registerer<Key, Interface, Args>;

            /// Link-time registration, collected on first access to the registry.
            pub struct Registration {
                key: fn() -> Key,
                creator: Creator,
            }

            impl Registration {
                pub const fn new(key: fn() -> Key, creator: Creator) -> Self {
                    Self { key, creator }
                }
            }

            $crate::__private::inventory::collect!(Registration);

            static REGISTRY: ::std::sync::LazyLock<Registry> = ::std::sync::LazyLock::new(|| {
                let registry = Registry::new(::std::module_path!());
                let mut collected = 0usize;
                for registration in $crate::__private::inventory::iter::<Registration> {
                    Registerer::new((registration.key)(), &registry, registration.creator);
                    collected += 1;
                }
                $crate::__private::tracing::debug!(
                    registry = registry.name(),
                    collected,
                    "registry initialized"
                );
                registry
            });

            /// The shared registry.
            pub fn registry() -> &'static Registry {
                &REGISTRY
            }

            /// Registers `creator` under `key`. A duplicate key terminates the process.
            pub fn register(key: impl ::std::convert::Into<Key>, creator: Creator) -> Registerer {
                Registerer::new(::std::convert::Into::into(key), registry(), creator)
            }

            /// Registers `creator` under `key`, returning an error on a duplicate key.
            pub fn try_register(
                key: impl ::std::convert::Into<Key>,
                creator: Creator,
            ) -> ::core::result::Result<(), $crate::RegistryError> {
                registry().try_register(::std::convert::Into::into(key), creator)
            }

            pub fn has<Q>(key: &Q) -> bool
            where
                Key: ::std::borrow::Borrow<Q>,
                Q: ::std::hash::Hash + ::std::cmp::Eq + ::std::fmt::Display + ?Sized,
            {
                registry().has(key)
            }

            /// Creates the implementation registered under `key`.
            pub fn create<Q>(
                key: &Q,
                args: Args,
            ) -> ::core::result::Result<::std::boxed::Box<Interface>, $crate::RegistryError>
            where
                Key: ::std::borrow::Borrow<Q>,
                Q: ::std::hash::Hash + ::std::cmp::Eq + ::std::fmt::Display + ?Sized,
            {
                registry().create(key, args)
            }

            pub fn keys() -> ::std::vec::Vec<Key> {
                registry().keys()
            }

            pub fn registered_keys() -> $crate::RegisteredKeys<Key> {
                registry().registered_keys()
            }

            pub fn set_trace_callback(
                callback: impl Fn(&$crate::RegistryEvent) + ::std::marker::Send + ::std::marker::Sync + 'static,
            ) {
                registry().set_trace_callback(callback)
            }

            pub fn clear_trace_callback() {
                registry().clear_trace_callback()
            }

            /// Creator that builds `D` through its `Construct` implementation.
            pub fn default_creator<D>(args: Args) -> ::std::boxed::Box<Interface>
            where
                D: $iface + $crate::Construct<Args> + 'static,
            {
                ::std::boxed::Box::new(<D as $crate::Construct<Args>>::construct(args))
            }
        }
    };
}

/// Declares a factory registry keyed by `String`.
///
/// Same as [`define_typed_registry!`](crate::define_typed_registry) with
/// `String` as the key type; lookups accept `&str`.
///
/// # Examples
///
/// ```rust
/// use factory_registry::{define_registry, register_class};
///
/// pub trait Storage {
///     fn kind(&self) -> &'static str;
/// }
///
/// #[derive(Default)]
/// struct Memory;
/// impl Storage for Memory {
///     fn kind(&self) -> &'static str {
///         "memory"
///     }
/// }
///
/// define_registry!(pub storages: dyn Storage);
///
/// register_class!(storages, "memory", Memory);
///
/// fn main() {
///     let storage = storages::create("memory", ()).unwrap();
///     assert_eq!(storage.kind(), "memory");
///     assert_eq!(storages::keys(), vec!["memory"]);
/// }
/// ```
///
/// Creators that take arguments list the argument types after the interface:
///
/// ```rust
/// use factory_registry::{define_registry, register_creator};
///
/// pub trait Kernel {
///     fn apply(&self, x: f32) -> f32;
/// }
///
/// struct Scale(f32);
/// impl Kernel for Scale {
///     fn apply(&self, x: f32) -> f32 {
///         x * self.0
///     }
/// }
///
/// define_registry!(kernels: dyn Kernel, (f32,));
///
/// register_creator!(kernels, "scale", |(factor,)| Box::new(Scale(factor)));
///
/// fn main() {
///     let kernel = kernels::create("scale", (2.0,)).unwrap();
///     assert_eq!(kernel.apply(4.0), 8.0);
/// }
/// ```
#[macro_export]
macro_rules! define_registry {
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident : dyn $iface:path $(, ($($arg:ty),* $(,)?))?
    ) => {
        $crate::define_typed_registry!(
            $(#[$meta])*
            $vis $name<::std::string::String>: dyn $iface $(, ($($arg),*))?
        );
    };
}

/// Registers a creator function under a key, at link time.
///
/// ```text
/// register_creator!(path::to::registry, KEY, CREATOR);
/// ```
///
/// `KEY` is converted with `Into` into the registry's key type. `CREATOR` is
/// anything that coerces to the registry's `Creator` function pointer: a
/// function item or a non-capturing closure.
///
/// The registration is applied when the registry is first accessed. Two
/// registrations with the same key terminate the process at that point.
#[macro_export]
macro_rules! register_creator {
    ($($registry:ident)::+, $key:expr, $creator:expr $(,)?) => {
        $crate::__private::inventory::submit! {
            $($registry)::+::Registration::new(
                || ::std::convert::Into::into($key),
                $creator,
            )
        }
    };
}

/// Registers a concrete type under a key, at link time.
///
/// ```text
/// register_class!(path::to::registry, KEY, TYPE);
/// ```
///
/// `TYPE` must implement the registry's interface and
/// [`Construct`](crate::Construct) for the registry's argument tuple; any
/// `Default` type qualifies for registries without arguments.
#[macro_export]
macro_rules! register_class {
    ($($registry:ident)::+, $key:expr, $class:ty $(,)?) => {
        $crate::register_creator!(
            $($registry)::+,
            $key,
            $($registry)::+::default_creator::<$class>
        );
    };
}
