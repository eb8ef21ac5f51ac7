//! Name-keyed dependency injection container
//!
//! Bindings map a name to an implementation recipe (a constructible type, a
//! factory, a pre-built instance or null) and a lifetime. Resolving a name
//! builds the recipe, recursively injecting constructor parameters from
//! overrides, other bindings, or declared defaults.

pub mod config;
pub mod container;
pub mod errors;

pub use config::{ConfigError, RegistryConfig, RegistryConfigBuilder};
pub use container::{
    default_registry, instance, Arguments, Binding, BindingInfo, Constructible, Factory,
    Implementation, Instance, Lifetime, Overrides, Parameter, Registry, TypeDescriptor,
};
pub use errors::CoreError;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version
pub fn version() -> &'static str {
    VERSION
}
