use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::config::RegistryConfig;
use crate::container::arguments::{Instance, Overrides};
use crate::container::binding::{Binding, Implementation};
use crate::container::catalog::TypeCatalog;
use crate::container::debug::BindingInfo;
use crate::container::descriptor::{Constructible, TypeDescriptor};
use crate::container::lifetime::Lifetime;
use crate::container::monitor::ResolutionMonitor;
use crate::container::resolver::DependencyResolver;
use crate::errors::CoreError;

/// Name-keyed container of bindings
///
/// Holds at most one binding per name; registering a name again replaces the
/// previous binding together with its cached singleton. Registries are
/// independent of each other, so tests can build their own instead of
/// sharing the process-wide default registry.
pub struct Registry {
    bindings: RwLock<HashMap<String, Arc<Binding>>>,
    types: TypeCatalog,
    monitor: ResolutionMonitor,
    config: RegistryConfig,
}

impl Registry {
    /// Create an empty registry with the default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with the given configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            bindings: RwLock::new(HashMap::new()),
            types: TypeCatalog::new(),
            monitor: ResolutionMonitor::new(),
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub(crate) fn monitor(&self) -> &ResolutionMonitor {
        &self.monitor
    }

    /// Register `implementation` under `name`, replacing any existing binding
    pub fn register(
        &self,
        name: impl Into<String>,
        implementation: Implementation,
        lifetime: Lifetime,
        overrides: Overrides,
    ) -> Result<&Self, CoreError> {
        let binding = Binding::new(name, lifetime, implementation).with_overrides(overrides);
        self.register_binding(binding)
    }

    /// Register a binding that builds a new instance on every resolution
    pub fn bind_multiple(
        &self,
        name: impl Into<String>,
        implementation: Implementation,
        overrides: Overrides,
    ) -> Result<&Self, CoreError> {
        self.register(name, implementation, Lifetime::Multiple, overrides)
    }

    /// Register a binding that builds its instance once and shares it
    pub fn bind_singleton(
        &self,
        name: impl Into<String>,
        implementation: Implementation,
        overrides: Overrides,
    ) -> Result<&Self, CoreError> {
        self.register(name, implementation, Lifetime::Singleton, overrides)
    }

    /// Install a fully configured binding
    pub fn register_binding(&self, mut binding: Binding) -> Result<&Self, CoreError> {
        binding.apply_default_fire_errors(*self.config.get_fire_errors());

        tracing::debug!(
            binding = binding.name(),
            lifetime = %binding.lifetime(),
            implementation = ?binding.implementation().kind(),
            "registered binding"
        );

        let mut bindings = self
            .bindings
            .write()
            .map_err(|_| CoreError::lock("bindings"))?;
        bindings.insert(binding.name().to_string(), Arc::new(binding));
        Ok(self)
    }

    /// Check if a binding is registered under `name`
    pub fn has(&self, name: &str) -> bool {
        self.bindings
            .read()
            .map(|bindings| bindings.contains_key(name))
            .unwrap_or(false)
    }

    /// Binding registered under `name`
    pub fn binding(&self, name: &str) -> Option<Arc<Binding>> {
        self.lookup(name).ok().flatten()
    }

    /// Resolve the binding registered under `name`
    ///
    /// `args` replace the binding's stored overrides for this call and are
    /// rejected for singleton bindings. Failures raised while the binding
    /// resolves are wrapped in [`CoreError::ResolutionFailed`] naming `name`.
    pub fn resolve(&self, name: &str, args: Option<&Overrides>) -> Result<Option<Instance>, CoreError> {
        let binding = self
            .lookup(name)?
            .ok_or_else(|| CoreError::binding_not_found(name))?;

        if args.is_some() && binding.lifetime().is_singleton() {
            return Err(CoreError::invalid_arguments(name));
        }

        binding
            .resolve(self, args)
            .map_err(|error| CoreError::resolution_failed(name, error))
    }

    /// Resolve `name` and downcast the result to `T`
    pub fn resolve_as<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, CoreError> {
        self.resolve_with_as::<T>(name, None)
    }

    /// Resolve `name` with call-site arguments and downcast the result to `T`
    pub fn resolve_with_as<T: Send + Sync + 'static>(
        &self,
        name: &str,
        args: Option<&Overrides>,
    ) -> Result<Arc<T>, CoreError> {
        let resolved = self
            .resolve(name, args)?
            .ok_or_else(|| CoreError::NullInstance {
                name: name.to_string(),
            })?;

        resolved.downcast::<T>().map_err(|_| CoreError::TypeMismatch {
            name: name.to_string(),
            expected: std::any::type_name::<T>(),
        })
    }

    /// Change whether the binding under `name` propagates its failures
    pub fn set_fire_errors(&self, name: &str, fire_errors: bool) -> Result<(), CoreError> {
        let binding = self
            .lookup(name)?
            .ok_or_else(|| CoreError::binding_not_found(name))?;
        binding.set_fire_errors(fire_errors);
        Ok(())
    }

    /// Whether the binding under `name` is on some thread's resolution stack
    pub fn is_resolving(&self, name: &str) -> bool {
        self.binding(name)
            .map(|binding| self.monitor.is_resolving(&binding.id()))
            .unwrap_or(false)
    }

    /// Remove every binding and cached instance of this registry
    pub fn clear(&self) -> Result<(), CoreError> {
        let mut bindings = self
            .bindings
            .write()
            .map_err(|_| CoreError::lock("bindings"))?;
        let removed = bindings.len();
        bindings.clear();

        tracing::info!(removed, "cleared registry bindings");
        Ok(())
    }

    /// Register a [`Constructible`] type so type references can build it
    pub fn register_type<T: Constructible>(&self) -> Result<&Self, CoreError> {
        self.types.register::<T>()?;
        Ok(self)
    }

    /// Register a hand-built type descriptor
    pub fn register_descriptor(&self, descriptor: TypeDescriptor) -> Result<&Self, CoreError> {
        self.types.insert(descriptor)?;
        Ok(self)
    }

    pub fn has_type(&self, type_identifier: &str) -> bool {
        self.types.contains(type_identifier)
    }

    pub fn type_descriptor(&self, type_identifier: &str) -> Result<Option<Arc<TypeDescriptor>>, CoreError> {
        self.types.get(type_identifier)
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Drop all registered type descriptors
    pub fn clear_types(&self) -> Result<(), CoreError> {
        self.types.clear()
    }

    /// Registered binding names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .bindings
            .read()
            .map(|bindings| bindings.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.bindings
            .read()
            .map(|bindings| bindings.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every binding, sorted by name
    pub fn bindings_info(&self) -> Result<Vec<BindingInfo>, CoreError> {
        let bindings = self
            .bindings
            .read()
            .map_err(|_| CoreError::lock("bindings"))?;

        let mut infos: Vec<BindingInfo> = bindings
            .values()
            .map(|binding| BindingInfo::from_binding(binding, self.monitor.is_resolving(&binding.id())))
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(infos)
    }

    fn lookup(&self, name: &str) -> Result<Option<Arc<Binding>>, CoreError> {
        let bindings = self
            .bindings
            .read()
            .map_err(|_| CoreError::lock("bindings"))?;
        Ok(bindings.get(name).cloned())
    }
}

impl DependencyResolver for Registry {
    fn has(&self, name: &str) -> bool {
        Registry::has(self, name)
    }

    fn resolve(&self, name: &str, args: Option<&Overrides>) -> Result<Option<Instance>, CoreError> {
        Registry::resolve(self, name, args)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("bindings", &self.names())
            .field("types", &self.types.len())
            .field("config", &self.config)
            .finish()
    }
}
