//! One process-wide registry per `(key, interface, arguments)` instantiation.
//!
//! Rust has no generic statics, so [`registry_for`] keeps a type-erased map
//! from the registry's `TypeId` to a leaked `&'static` registry. The first call
//! for an instantiation creates its registry; every later call, from any
//! module or thread, returns the same one. Registries created here live until
//! the process exits.
//!
//! # Examples
//!
//! ```
//! use factory_registry::registry_for;
//!
//! trait Shape {
//!     fn sides(&self) -> u32;
//! }
//!
//! struct Triangle;
//! impl Shape for Triangle {
//!     fn sides(&self) -> u32 {
//!         3
//!     }
//! }
//!
//! registry_for::<String, dyn Shape, ()>().register("triangle".to_string(), |()| Box::new(Triangle));
//!
//! // Somewhere else entirely:
//! let shape = registry_for::<String, dyn Shape, ()>().create("triangle", ()).unwrap();
//! assert_eq!(shape.sides(), 3);
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};

use crate::registry::{Registry, RegistryKey};

/// Registries handed out by [`registry_for`], indexed by `TypeId` of the
/// concrete `Registry<K, I, A>`.
static GLOBAL_REGISTRIES: LazyLock<Mutex<HashMap<TypeId, &'static (dyn Any + Send + Sync)>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Returns the process-wide registry for `(K, I, A)`, creating it on first
/// use.
///
/// The registry is named after its interface type, e.g. `dyn my_crate::Shape`.
pub fn registry_for<K, I, A>() -> &'static Registry<K, I, A>
where
    K: RegistryKey,
    I: ?Sized + 'static,
    A: 'static,
{
    let mut registries = GLOBAL_REGISTRIES
        .lock()
        // Entries are inserted whole; a poisoned map is still consistent.
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let entry = *registries
        .entry(TypeId::of::<Registry<K, I, A>>())
        .or_insert_with(|| {
            tracing::debug!(
                interface = std::any::type_name::<I>(),
                "creating process-wide registry"
            );
            let registry: &'static Registry<K, I, A> =
                Box::leak(Box::new(Registry::new(std::any::type_name::<I>())));
            registry as &'static (dyn Any + Send + Sync)
        });

    match entry.downcast_ref::<Registry<K, I, A>>() {
        Some(registry) => registry,
        // The map is keyed by this exact type, so the downcast cannot fail.
        None => unreachable!("registry stored under a foreign TypeId"),
    }
}
