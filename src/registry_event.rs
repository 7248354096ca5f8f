/// Events emitted by a registry during operations.
///
/// These events are passed to the tracing callback set via
/// [`Registry::set_trace_callback`](crate::Registry::set_trace_callback).
/// Keys are carried in their `Display` form so one callback type serves every
/// key type.
///
/// # Examples
///
/// ```rust
/// use factory_registry::RegistryEvent;
///
/// let event = RegistryEvent::Register { registry: "db", key: "leveldb".to_string() };
/// assert_eq!(event.to_string(), "register { registry: db, key: leveldb }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A creator was registered under `key`.
    Register {
        /// Name of the registry the event belongs to.
        registry: &'static str,
        key: String,
    },

    /// A membership check was performed.
    Has {
        registry: &'static str,
        key: String,
        found: bool,
    },

    /// An instance was requested.
    Create {
        registry: &'static str,
        key: String,
        /// Whether a creator was found and invoked.
        found: bool,
    },
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryEvent::Register { registry, key } => {
                write!(f, "register {{ registry: {}, key: {} }}", registry, key)
            }
            RegistryEvent::Has {
                registry,
                key,
                found,
            } => {
                write!(
                    f,
                    "has {{ registry: {}, key: {}, found: {} }}",
                    registry, key, found
                )
            }
            RegistryEvent::Create {
                registry,
                key,
                found,
            } => {
                write!(
                    f,
                    "create {{ registry: {}, key: {}, found: {} }}",
                    registry, key, found
                )
            }
        }
    }
}
