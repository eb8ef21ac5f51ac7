use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::container::arguments::{instance, Arguments, Instance, Overrides};
use crate::container::descriptor::{Constructible, Parameter};
use crate::container::lifetime::Lifetime;
use crate::container::monitor::DepthGuard;
use crate::container::registry::Registry;
use crate::container::resolver::ParameterResolver;
use crate::errors::CoreError;

/// Factory callable; `None` is a null result
pub type FactoryFn = Arc<dyn Fn(&Arguments) -> Result<Option<Instance>, CoreError> + Send + Sync>;

/// Callable recipe with an explicit parameter list
#[derive(Clone)]
pub struct Factory {
    parameters: Vec<Parameter>,
    call: FactoryFn,
}

impl Factory {
    /// Factory producing a value of type `T`
    pub fn new<F, T>(parameters: Vec<Parameter>, factory: F) -> Self
    where
        F: Fn(&Arguments) -> Result<T, CoreError> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        Self {
            parameters,
            call: Arc::new(move |args: &Arguments| factory(args).map(|value| Some(instance(value)))),
        }
    }

    /// Factory that may produce null
    pub fn nullable<F, T>(parameters: Vec<Parameter>, factory: F) -> Self
    where
        F: Fn(&Arguments) -> Result<Option<T>, CoreError> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        Self {
            parameters,
            call: Arc::new(move |args: &Arguments| factory(args).map(|value| value.map(instance))),
        }
    }

    /// Factory taking no parameters
    pub fn from_fn<F, T>(factory: F) -> Self
    where
        F: Fn() -> Result<T, CoreError> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        Self::new(Vec::new(), move |_: &Arguments| factory())
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn call(&self, args: &Arguments) -> Result<Option<Instance>, CoreError> {
        (self.call)(args)
    }
}

impl std::fmt::Debug for Factory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory")
            .field("parameters", &self.parameters)
            .field("call", &"<factory_fn>")
            .finish()
    }
}

/// What a binding resolves to
#[derive(Clone)]
pub enum Implementation {
    /// Resolves to null
    Null,
    /// A type registered in the registry's type catalog
    TypeReference(String),
    /// A callable invoked with resolved arguments
    Factory(Factory),
    /// A pre-built object, returned as-is
    Instance(Instance),
}

impl Implementation {
    pub fn null() -> Self {
        Implementation::Null
    }

    /// Reference a catalog type by identifier
    pub fn type_ref(type_identifier: impl Into<String>) -> Self {
        Implementation::TypeReference(type_identifier.into())
    }

    /// Reference a [`Constructible`] type
    pub fn of<T: Constructible>() -> Self {
        Implementation::TypeReference(T::type_identifier().to_string())
    }

    pub fn factory(factory: Factory) -> Self {
        Implementation::Factory(factory)
    }

    pub fn instance<T: Send + Sync + 'static>(value: T) -> Self {
        Implementation::Instance(instance(value))
    }

    pub fn kind(&self) -> ImplementationKind {
        match self {
            Implementation::Null => ImplementationKind::Null,
            Implementation::TypeReference(_) => ImplementationKind::TypeReference,
            Implementation::Factory(_) => ImplementationKind::Factory,
            Implementation::Instance(_) => ImplementationKind::Instance,
        }
    }
}

impl std::fmt::Debug for Implementation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Implementation::Null => write!(f, "Null"),
            Implementation::TypeReference(id) => f.debug_tuple("TypeReference").field(id).finish(),
            Implementation::Factory(factory) => f.debug_tuple("Factory").field(factory).finish(),
            Implementation::Instance(_) => f.debug_tuple("Instance").field(&"<instance>").finish(),
        }
    }
}

/// Implementation variant without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplementationKind {
    Null,
    TypeReference,
    Factory,
    Instance,
}

/// One registered recipe: name, lifetime, implementation and resolution state
pub struct Binding {
    id: Uuid,
    name: String,
    lifetime: Lifetime,
    implementation: Implementation,
    overrides: Overrides,
    fire_errors: AtomicBool,
    fire_errors_explicit: bool,
    registered_at: DateTime<Utc>,
    /// Singleton result; `Some(None)` is a cached null
    cached: RwLock<Option<Option<Instance>>>,
}

impl Binding {
    pub fn new(name: impl Into<String>, lifetime: Lifetime, implementation: Implementation) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            lifetime,
            implementation,
            overrides: Overrides::new(),
            fire_errors: AtomicBool::new(true),
            fire_errors_explicit: false,
            registered_at: Utc::now(),
            cached: RwLock::new(None),
        }
    }

    pub fn singleton(name: impl Into<String>, implementation: Implementation) -> Self {
        Self::new(name, Lifetime::Singleton, implementation)
    }

    pub fn multiple(name: impl Into<String>, implementation: Implementation) -> Self {
        Self::new(name, Lifetime::Multiple, implementation)
    }

    /// Literal parameter values used when resolving without call-site arguments
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Whether resolution failures propagate (`true`) or yield null (`false`)
    ///
    /// Only failures while building are turned into null. A cycle or depth
    /// limit hit when entering this binding is returned to the caller, whose
    /// own setting then decides.
    pub fn with_fire_errors(mut self, fire_errors: bool) -> Self {
        self.fire_errors = AtomicBool::new(fire_errors);
        self.fire_errors_explicit = true;
        self
    }

    /// Apply the registry default unless the binding chose explicitly
    pub(crate) fn apply_default_fire_errors(&mut self, fire_errors: bool) {
        if !self.fire_errors_explicit {
            self.fire_errors = AtomicBool::new(fire_errors);
        }
    }

    pub fn set_fire_errors(&self, fire_errors: bool) {
        self.fire_errors.store(fire_errors, Ordering::SeqCst);
    }

    pub fn fire_errors(&self) -> bool {
        self.fire_errors.load(Ordering::SeqCst)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn implementation(&self) -> &Implementation {
        &self.implementation
    }

    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Whether a singleton result has been cached
    pub fn is_cached(&self) -> bool {
        self.cached
            .read()
            .map(|cached| cached.is_some())
            .unwrap_or(false)
    }

    /// Resolve this binding against `registry`
    ///
    /// Singletons are built at most once and served from the cache
    /// afterwards. Call-site `args` replace the stored overrides and are only
    /// accepted for `Multiple` bindings.
    pub fn resolve(&self, registry: &Registry, args: Option<&Overrides>) -> Result<Option<Instance>, CoreError> {
        if args.is_some() && self.lifetime.is_singleton() {
            return Err(CoreError::invalid_arguments(&self.name));
        }

        if let Some(cached) = self.cached()? {
            tracing::trace!(binding = %self.name, "singleton cache hit");
            return Ok(cached);
        }

        let _depth = DepthGuard::enter(&self.name, *registry.config().get_max_depth())?;
        let _resolving = registry.monitor().enter(self.id, &self.name)?;

        // Another thread may have finished building while we waited.
        if let Some(cached) = self.cached()? {
            return Ok(cached);
        }

        match self.build(registry, args) {
            Ok(value) => {
                if self.lifetime.is_singleton() {
                    let mut cached = self
                        .cached
                        .write()
                        .map_err(|_| CoreError::lock(format!("binding:{}", self.name)))?;
                    *cached = Some(value.clone());
                }
                tracing::debug!(
                    binding = %self.name,
                    lifetime = %self.lifetime,
                    null = value.is_none(),
                    "resolved binding"
                );
                Ok(value)
            }
            Err(error) if self.fire_errors() => Err(error),
            Err(error) => {
                tracing::warn!(binding = %self.name, %error, "resolution failed, yielding null");
                Ok(None)
            }
        }
    }

    fn cached(&self) -> Result<Option<Option<Instance>>, CoreError> {
        let cached = self
            .cached
            .read()
            .map_err(|_| CoreError::lock(format!("binding:{}", self.name)))?;
        Ok(cached.clone())
    }

    fn build(&self, registry: &Registry, args: Option<&Overrides>) -> Result<Option<Instance>, CoreError> {
        let overrides = args.unwrap_or(&self.overrides);

        match &self.implementation {
            Implementation::Null => Ok(None),
            Implementation::Factory(factory) => {
                let arguments = ParameterResolver::resolve(registry, factory.parameters(), overrides)?;
                factory.call(&arguments)
            }
            Implementation::TypeReference(type_identifier) => {
                let descriptor = registry
                    .type_descriptor(type_identifier)?
                    .ok_or_else(|| CoreError::UnknownType {
                        type_name: type_identifier.clone(),
                    })?;

                let arguments = if descriptor.parameters().is_empty() {
                    Arguments::new()
                } else {
                    ParameterResolver::resolve(registry, descriptor.parameters(), overrides)?
                };
                descriptor.construct(&arguments).map(Some)
            }
            Implementation::Instance(instance) => Ok(Some(instance.clone())),
        }
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("lifetime", &self.lifetime)
            .field("implementation", &self.implementation)
            .field("overrides", &self.overrides)
            .field("fire_errors", &self.fire_errors())
            .field("cached", &self.is_cached())
            .finish()
    }
}
