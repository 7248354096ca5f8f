//! The key → creator map behind every factory registry.
//!
//! A [`Registry`] maps a key to a [`Creator`], a plain function pointer that
//! builds one boxed instance of the registry's interface type from an argument
//! tuple. Registration is append-only: a key can be claimed once and never
//! removed. Creation copies the creator out of the map before invoking it, so
//! constructors are free to use other registries (or this one).
//!
//! # Examples
//!
//! ```
//! use factory_registry::Registry;
//!
//! trait Codec {
//!     fn name(&self) -> &'static str;
//! }
//!
//! struct Raw;
//! impl Codec for Raw {
//!     fn name(&self) -> &'static str {
//!         "raw"
//!     }
//! }
//!
//! let codecs: Registry<String, dyn Codec> = Registry::new("codecs");
//! codecs.register("raw".to_string(), |()| Box::new(Raw));
//!
//! assert!(codecs.has("raw"));
//! assert_eq!(codecs.create("raw", ()).unwrap().name(), "raw");
//! assert!(codecs.create("zstd", ()).is_err());
//! ```

use std::borrow::Borrow;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard};

use crate::{RegistryError, RegistryEvent};

/// Constructor stored in a registry.
///
/// `A` is the argument tuple: `()` for no arguments, `(T,)` for one, `(T, U)`
/// for two, and so on. The creator captures nothing; everything it needs comes
/// through `A`.
pub type Creator<I, A = ()> = fn(A) -> Box<I>;

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a [`RegistryEvent`] every time the
/// registry is interacted with. It must be thread-safe because registries are
/// usually process-wide statics.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

/// Bounds every registry key has to satisfy.
///
/// `Ord` gives deterministic listings, `Display` feeds diagnostics.
pub trait RegistryKey:
    Eq + Hash + Ord + Clone + fmt::Display + fmt::Debug + Send + Sync + 'static
{
}

impl<T> RegistryKey for T where
    T: Eq + Hash + Ord + Clone + fmt::Display + fmt::Debug + Send + Sync + 'static
{
}

/// A factory registry for one interface type `I`, keyed by `K`, whose
/// creators take the argument tuple `A`.
pub struct Registry<K, I: ?Sized, A = ()> {
    name: &'static str,
    creators: RwLock<HashMap<K, Creator<I, A>>>,
    trace: Mutex<Option<Arc<TraceCallback>>>,
}

impl<K, I: ?Sized, A> Registry<K, I, A> {
    /// Creates an empty registry. `name` only appears in diagnostics.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            creators: RwLock::new(HashMap::new()),
            trace: Mutex::new(None),
        }
    }

    /// Name given at construction.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of registered creators.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Set a tracing callback for registry operations.
    ///
    /// The callback is invoked after every `register`, `has` and `create`.
    /// It runs without any registry lock held, so it may call back into the
    /// registry.
    pub fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    /// Clear the tracing callback.
    pub fn clear_trace_callback(&self) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    /// Builds the event only when somebody is listening.
    fn emit_event(&self, event: impl FnOnce() -> RegistryEvent) {
        let callback = self
            .trace
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        if let Some(callback) = callback {
            callback(&event());
        }
    }

    // The map only ever gains whole entries, so a poisoned lock still guards a
    // consistent map.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<K, Creator<I, A>>> {
        self.creators.read().unwrap_or_else(|p| p.into_inner())
    }
}

impl<K: RegistryKey, I: ?Sized, A> Registry<K, I, A> {
    /// Registers `creator` under `key`.
    ///
    /// # Fatal errors
    ///
    /// A key that is already present means two implementations claimed the
    /// same name. That is a build configuration error with no safe recovery:
    /// the offending key is written to stderr and the process exits with
    /// status 1. No logging framework is involved because registration may
    /// run before one is initialized.
    ///
    /// Use [`try_register`](Self::try_register) to get the error as a value.
    pub fn register(&self, key: K, creator: Creator<I, A>) {
        if let Err(err) = self.try_register(key, creator) {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }

    /// Registers `creator` under `key`, or returns
    /// [`RegistryError::DuplicateKey`] without touching the registry if the
    /// key is taken. The first registration is never replaced.
    pub fn try_register(&self, key: K, creator: Creator<I, A>) -> Result<(), RegistryError> {
        let key = {
            let mut creators = self.creators.write().unwrap_or_else(|p| p.into_inner());
            match creators.entry(key) {
                Entry::Occupied(occupied) => {
                    return Err(RegistryError::DuplicateKey {
                        registry: self.name.to_string(),
                        key: occupied.key().to_string(),
                    });
                }
                Entry::Vacant(vacant) => {
                    let key = vacant.key().to_string();
                    vacant.insert(creator);
                    key
                }
            }
        };

        tracing::trace!(registry = self.name, key = %key, "registered creator");
        self.emit_event(|| RegistryEvent::Register {
            registry: self.name,
            key,
        });

        Ok(())
    }

    /// Returns `true` if a creator is registered under `key`.
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ?Sized,
    {
        let found = self.read().contains_key(key);

        self.emit_event(|| RegistryEvent::Has {
            registry: self.name,
            key: key.to_string(),
            found,
        });

        found
    }

    /// Creates a new instance of the implementation registered under `key`.
    ///
    /// Ownership of the instance passes to the caller.
    ///
    /// # Errors
    ///
    /// [`RegistryError::KeyNotFound`] if nothing is registered under `key`.
    /// The error carries every registered key in sorted order; the same list
    /// is logged at `warn` level. A miss never terminates the process.
    pub fn create<Q>(&self, key: &Q, args: A) -> Result<Box<I>, RegistryError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ?Sized,
    {
        // Copy the fn pointer out so the constructor runs without the lock.
        let creator = self.read().get(key).copied();

        self.emit_event(|| RegistryEvent::Create {
            registry: self.name,
            key: key.to_string(),
            found: creator.is_some(),
        });

        match creator {
            Some(creator) => Ok(creator(args)),
            None => {
                let available: Vec<String> = self.keys().iter().map(ToString::to_string).collect();
                tracing::warn!(
                    registry = self.name,
                    key = %key,
                    available = ?available,
                    "key not found, no instance created"
                );
                Err(RegistryError::KeyNotFound {
                    registry: self.name.to_string(),
                    key: key.to_string(),
                    available,
                })
            }
        }
    }

    /// All registered keys, sorted.
    pub fn keys(&self) -> Vec<K> {
        let mut keys: Vec<K> = self.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Sorted key listing with a printable summary.
    ///
    /// Meant for debugging and tooling, not for control flow.
    pub fn registered_keys(&self) -> RegisteredKeys<K> {
        RegisteredKeys { keys: self.keys() }
    }
}

impl<K: RegistryKey, I: ?Sized, A> fmt::Debug for Registry<K, I, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("name", &self.name)
            .field("keys", &self.keys())
            .finish()
    }
}

/// Snapshot of a registry's keys in sorted order.
///
/// Its `Display` form lists one key per line followed by the total:
///
/// ```text
/// Registry key: alpha
/// Registry key: beta
/// A total of 2 registered keys.
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredKeys<K> {
    keys: Vec<K>,
}

impl<K> RegisteredKeys<K> {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn as_slice(&self) -> &[K] {
        &self.keys
    }

    pub fn iter(&self) -> std::slice::Iter<'_, K> {
        self.keys.iter()
    }

    pub fn into_vec(self) -> Vec<K> {
        self.keys
    }
}

impl<K> IntoIterator for RegisteredKeys<K> {
    type Item = K;
    type IntoIter = std::vec::IntoIter<K>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}

impl<K: fmt::Display> fmt::Display for RegisteredKeys<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.keys {
            writeln!(f, "Registry key: {key}")?;
        }
        write!(f, "A total of {} registered keys.", self.keys.len())
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    trait Greeter {
        fn greet(&self) -> String;
    }

    struct Alpha;
    impl Greeter for Alpha {
        fn greet(&self) -> String {
            "alpha".to_string()
        }
    }

    struct Beta;
    impl Greeter for Beta {
        fn greet(&self) -> String {
            "beta".to_string()
        }
    }

    fn make_alpha(_: ()) -> Box<dyn Greeter> {
        Box::new(Alpha)
    }

    fn make_beta(_: ()) -> Box<dyn Greeter> {
        Box::new(Beta)
    }

    fn alpha_beta() -> Registry<String, dyn Greeter> {
        let registry = Registry::new("greeters");
        registry.register("alpha".to_string(), make_alpha);
        registry.register("beta".to_string(), make_beta);
        registry
    }

    #[test]
    fn test_has() {
        let registry = alpha_beta();
        assert!(registry.has("alpha"));
        assert!(registry.has("beta"));
        assert!(!registry.has("gamma"));
    }

    #[test]
    fn test_create_dispatches_to_registered_creator() {
        let registry = alpha_beta();
        assert_eq!(registry.create("alpha", ()).unwrap().greet(), "alpha");
        assert_eq!(registry.create("beta", ()).unwrap().greet(), "beta");
    }

    #[test]
    fn test_create_returns_fresh_instances() {
        let registry = alpha_beta();
        let a = registry.create("alpha", ()).unwrap();
        let b = registry.create("alpha", ()).unwrap();
        assert_eq!(a.greet(), b.greet());
    }

    #[test]
    fn test_create_unknown_key_lists_available() {
        let registry = alpha_beta();
        let err = registry.create("gamma", ()).err().unwrap();
        assert_eq!(
            err,
            RegistryError::KeyNotFound {
                registry: "greeters".to_string(),
                key: "gamma".to_string(),
                available: vec!["alpha".to_string(), "beta".to_string()],
            }
        );
    }

    #[test]
    fn test_try_register_duplicate_keeps_first() {
        let registry = alpha_beta();
        let err = registry
            .try_register("alpha".to_string(), make_beta)
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateKey {
                registry: "greeters".to_string(),
                key: "alpha".to_string(),
            }
        );
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.create("alpha", ()).unwrap().greet(), "alpha");
    }

    #[test]
    fn test_keys_sorted() {
        let registry: Registry<String, dyn Greeter> = Registry::new("sorted");
        for key in ["zeta", "alpha", "mu"] {
            registry.register(key.to_string(), make_alpha);
        }
        assert_eq!(registry.keys(), vec!["alpha", "mu", "zeta"]);
    }

    #[test]
    fn test_registered_keys_display() {
        let registry = alpha_beta();
        let listing = registry.registered_keys();
        assert_eq!(listing.len(), 2);
        assert_eq!(
            listing.to_string(),
            "Registry key: alpha\nRegistry key: beta\nA total of 2 registered keys."
        );
    }

    #[test]
    fn test_empty_registry() {
        let registry: Registry<String, dyn Greeter> = Registry::new("empty");
        assert!(registry.is_empty());
        assert!(registry.registered_keys().is_empty());
        assert_eq!(
            registry.registered_keys().to_string(),
            "A total of 0 registered keys."
        );
        assert!(registry.create("anything", ()).is_err());
    }

    #[test]
    fn test_creator_with_arguments() {
        struct Scaled(i32);
        impl Greeter for Scaled {
            fn greet(&self) -> String {
                self.0.to_string()
            }
        }

        let registry: Registry<String, dyn Greeter, (i32, i32)> = Registry::new("scaled");
        registry.register("mul".to_string(), |(a, b)| Box::new(Scaled(a * b)));
        registry.register("add".to_string(), |(a, b)| Box::new(Scaled(a + b)));

        assert_eq!(registry.create("mul", (6, 7)).unwrap().greet(), "42");
        assert_eq!(registry.create("add", (6, 7)).unwrap().greet(), "13");
    }

    #[test]
    fn test_non_string_keys() {
        let registry: Registry<u32, dyn Greeter> = Registry::new("numbered");
        registry.register(2, make_beta);
        registry.register(1, make_alpha);

        assert!(registry.has(&1));
        assert!(!registry.has(&3));
        assert_eq!(registry.keys(), vec![1, 2]);
        assert_eq!(
            registry.create(&3, ()).err().unwrap().to_string(),
            "key `3` not found in registry `numbered` (available: [1, 2])"
        );
    }

    #[test]
    fn test_trace_callback_events() {
        let registry: Registry<String, dyn Greeter> = Registry::new("traced");
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();

        registry.set_trace_callback(move |e| {
            events_clone.lock().unwrap().push(e.to_string());
        });

        registry.register("alpha".to_string(), make_alpha);
        let _ = registry.has("alpha");
        let _ = registry.create("gamma", ());

        let captured = events.lock().unwrap();
        assert_eq!(
            *captured,
            vec![
                "register { registry: traced, key: alpha }",
                "has { registry: traced, key: alpha, found: true }",
                "create { registry: traced, key: gamma, found: false }",
            ]
        );
    }

    #[test]
    fn test_failed_registration_emits_no_event() {
        let registry = alpha_beta();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        registry.set_trace_callback(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(registry.try_register("beta".to_string(), make_alpha).is_err());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_clear_trace_callback_stops_events() {
        let registry = alpha_beta();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        registry.set_trace_callback(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        let _ = registry.has("alpha");
        registry.clear_trace_callback();
        let _ = registry.has("alpha");
        let _ = registry.create("alpha", ());

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_may_reenter_registry() {
        let registry = Arc::new(alpha_beta());
        let inner = Arc::downgrade(&registry);
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();

        registry.set_trace_callback(move |_| {
            if let Some(registry) = inner.upgrade() {
                seen_clone.store(registry.len(), Ordering::SeqCst);
            }
        });

        assert!(registry.create("alpha", ()).is_ok());
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_concurrent_create() {
        let registry = Arc::new(alpha_beta());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    let key = if i % 2 == 0 { "alpha" } else { "beta" };
                    registry.create(key, ()).unwrap().greet()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let expected = if i % 2 == 0 { "alpha" } else { "beta" };
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    #[test]
    fn test_debug_lists_keys() {
        let registry = alpha_beta();
        assert_eq!(
            format!("{:?}", registry),
            r#"Registry { name: "greeters", keys: ["alpha", "beta"] }"#
        );
    }
}
