//! Registration as a side effect of construction.
//!
//! A [`Registerer`] exists only to perform one [`Registry::register`] call. The
//! macros in this crate build one per link-time registration when a registry
//! is first accessed; host programs that prefer an explicit start-up routine
//! can build them directly.

use std::fmt;
use std::marker::PhantomData;

use crate::registry::{Creator, Registry, RegistryKey};

/// Token proving that one creator was registered.
///
/// It carries no state; dropping it has no effect.
pub struct Registerer<K, I: ?Sized, A = ()> {
    _registry: PhantomData<fn() -> (K, Box<I>, A)>,
}

impl<K: RegistryKey, I: ?Sized, A> Registerer<K, I, A> {
    /// Registers `creator` under `key` in `registry`.
    ///
    /// Touches nothing but `registry`, so it is safe to run in any order
    /// relative to other registrations. A duplicate key terminates the process
    /// (see [`Registry::register`]).
    ///
    /// # Examples
    ///
    /// ```
    /// use factory_registry::{Registerer, Registry};
    ///
    /// trait Backend {}
    /// struct Memory;
    /// impl Backend for Memory {}
    ///
    /// let backends: Registry<String, dyn Backend> = Registry::new("backends");
    /// Registerer::new("memory".to_string(), &backends, |()| Box::new(Memory));
    ///
    /// assert!(backends.has("memory"));
    /// ```
    pub fn new(key: K, registry: &Registry<K, I, A>, creator: Creator<I, A>) -> Self {
        registry.register(key, creator);
        Self {
            _registry: PhantomData,
        }
    }
}

impl<K, I: ?Sized, A> fmt::Debug for Registerer<K, I, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Registerer")
    }
}

/// Builds a concrete implementation from a registry's argument tuple.
///
/// This is what lets `register_class!` register a type without a handwritten
/// creator. Every `Default` type constructs from `()`; types whose registry
/// takes arguments implement `Construct<(..)>` for that tuple.
///
/// ```
/// use factory_registry::Construct;
///
/// struct Pool {
///     size: usize,
/// }
///
/// impl Construct<(usize,)> for Pool {
///     fn construct((size,): (usize,)) -> Self {
///         Pool { size }
///     }
/// }
///
/// assert_eq!(Pool::construct((4,)).size, 4);
/// assert_eq!(<u8 as Construct<()>>::construct(()), 0);
/// ```
pub trait Construct<A>: Sized {
    fn construct(args: A) -> Self;
}

impl<T: Default> Construct<()> for T {
    fn construct(_: ()) -> Self {
        T::default()
    }
}
