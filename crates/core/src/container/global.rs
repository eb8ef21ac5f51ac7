//! Process-wide default registry
//!
//! Free functions mirror the [`Registry`] API against one lazily created
//! instance, configured from the environment on first use.

use std::sync::{Arc, OnceLock};

use crate::config::{ConfigError, RegistryConfig};
use crate::container::arguments::{Instance, Overrides};
use crate::container::binding::Implementation;
use crate::container::registry::Registry;
use crate::errors::CoreError;

static DEFAULT_REGISTRY: OnceLock<Registry> = OnceLock::new();

/// The shared registry, created on first access
pub fn default_registry() -> &'static Registry {
    DEFAULT_REGISTRY.get_or_init(|| {
        let config = RegistryConfig::from_env().unwrap_or_else(|error| {
            tracing::warn!(%error, "invalid registry environment, using defaults");
            RegistryConfig::default()
        });
        Registry::with_config(config)
    })
}

/// Install the shared registry with an explicit configuration
///
/// Fails once the registry exists, whether created here or by an earlier
/// access.
pub fn init_default_registry(config: RegistryConfig) -> Result<&'static Registry, CoreError> {
    config.validate()?;
    DEFAULT_REGISTRY
        .set(Registry::with_config(config))
        .map_err(|_| ConfigError::validation_failed("default registry is already initialized"))?;
    Ok(default_registry())
}

pub fn bind_multiple(
    name: impl Into<String>,
    implementation: Implementation,
    overrides: Overrides,
) -> Result<&'static Registry, CoreError> {
    default_registry().bind_multiple(name, implementation, overrides)
}

pub fn bind_singleton(
    name: impl Into<String>,
    implementation: Implementation,
    overrides: Overrides,
) -> Result<&'static Registry, CoreError> {
    default_registry().bind_singleton(name, implementation, overrides)
}

/// Resolve `name` from the shared registry
pub fn get(name: &str, args: Option<&Overrides>) -> Result<Option<Instance>, CoreError> {
    default_registry().resolve(name, args)
}

/// Resolve `name` from the shared registry and downcast it
pub fn get_as<T: Send + Sync + 'static>(name: &str) -> Result<Arc<T>, CoreError> {
    default_registry().resolve_as::<T>(name)
}

pub fn has(name: &str) -> bool {
    default_registry().has(name)
}

/// Drop every binding of the shared registry
pub fn clear() -> Result<(), CoreError> {
    default_registry().clear()
}
