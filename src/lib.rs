//! # Factory Registry
//!
//! A string-keyed factory registry: independently compiled components register
//! constructors for a shared trait under a name, and unrelated code creates the
//! right implementation from that name alone, typically a configuration
//! string such as `--db leveldb`.
//!
//! ## Quick Start
//!
//! ```rust
//! use factory_registry::{define_registry, register_class};
//!
//! pub trait Backend {
//!     fn name(&self) -> &'static str;
//! }
//!
//! #[derive(Default)]
//! struct Memory;
//!
//! impl Backend for Memory {
//!     fn name(&self) -> &'static str {
//!         "memory"
//!     }
//! }
//!
//! // Declare the registry (once, next to the trait)
//! define_registry!(pub backends: dyn Backend);
//!
//! // Register an implementation (anywhere, in any crate)
//! register_class!(backends, "memory", Memory);
//!
//! fn main() {
//!     // Create by name
//!     let backend = backends::create("memory", ()).unwrap();
//!     assert_eq!(backend.name(), "memory");
//!
//!     // Unknown names are an error value, not a crash
//!     assert!(backends::create("leveldb", ()).is_err());
//! }
//! ```
//!
//! ## Features
//!
//! - **Order independent**: link-time registrations are collected the first
//!   time a registry is used, whatever order they were linked in
//! - **Type-safe**: every registry is generic over its key, interface and
//!   constructor argument tuple
//! - **Fail fast on conflicts**: two implementations under the same key
//!   terminate the process; unknown keys are a recoverable [`RegistryError`]
//! - **Tracing support**: `tracing` diagnostics plus an optional per-registry
//!   event callback
//!
//! ## Main Items
//!
//! - [`define_registry!`] / [`define_typed_registry!`] - declare a registry module
//! - [`register_creator!`] / [`register_class!`] - link-time registration
//! - [`Registry`] - the key → creator map (`register`, `has`, `create`, `registered_keys`)
//! - [`Registerer`] - explicit registration from a start-up routine
//! - [`registry_for`] - one shared registry per `(key, interface, arguments)` type

mod global;
mod macros;
mod registerer;
mod registry;
mod registry_error;
mod registry_event;

pub use global::registry_for;
pub use registerer::{Construct, Registerer};
pub use registry::{Creator, RegisteredKeys, Registry, RegistryKey, TraceCallback};
pub use registry_error::RegistryError;
pub use registry_event::RegistryEvent;

#[doc(hidden)]
pub mod __private {
    pub use inventory;
    pub use tracing;
}
