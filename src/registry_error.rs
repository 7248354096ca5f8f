use thiserror::Error;

/// Errors returned by registry operations.
///
/// A duplicate key is a programming error and is normally fatal (see
/// [`Registry::register`](crate::Registry::register)). It is only surfaced as a
/// value through [`Registry::try_register`](crate::Registry::try_register).
/// A missing key is a configuration error and is always recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two registrations claimed the same key.
    #[error("key `{key}` already registered in registry `{registry}`")]
    DuplicateKey { registry: String, key: String },

    /// `create` was asked for a key nobody registered.
    #[error("key `{key}` not found in registry `{registry}` (available: [{}])", .available.join(", "))]
    KeyNotFound {
        registry: String,
        key: String,
        /// Every registered key at the time of the lookup, sorted.
        available: Vec<String>,
    },
}
