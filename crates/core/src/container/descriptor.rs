use std::sync::Arc;

use crate::container::arguments::{instance, Arguments, Instance};
use crate::errors::CoreError;

/// Identifier a type is conventionally registered under
pub fn type_identifier<T: ?Sized + 'static>() -> &'static str {
    std::any::type_name::<T>()
}

/// Strip an optional/nullable qualifier from a type identifier
///
/// Both the `?Foo` form and an `Option<Foo>` wrapper (as produced by
/// `std::any::type_name`) resolve to `Foo`.
pub fn strip_nullable(identifier: &str) -> &str {
    let identifier = identifier.trim();
    if let Some(inner) = identifier.strip_prefix('?') {
        return inner.trim();
    }
    for prefix in ["core::option::Option<", "std::option::Option<", "Option<"] {
        if let Some(inner) = identifier
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix('>'))
        {
            return inner.trim();
        }
    }
    identifier
}

/// Formal parameter of a constructor or factory
#[derive(Clone)]
pub struct Parameter {
    name: String,
    type_identifier: Option<String>,
    default: Option<Instance>,
}

impl Parameter {
    /// Untyped parameter; it can only be satisfied by an override or its default
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_identifier: None,
            default: None,
        }
    }

    /// Parameter declared with the Rust type `T`
    pub fn typed<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::new(name).with_type(type_identifier::<T>())
    }

    /// Nullable parameter declared with the Rust type `T`
    pub fn nullable<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::new(name).with_type(format!("?{}", type_identifier::<T>()))
    }

    /// Set the declared type identifier (may carry a `?` qualifier)
    pub fn with_type(mut self, identifier: impl Into<String>) -> Self {
        self.type_identifier = Some(identifier.into());
        self
    }

    /// Set the default value used when nothing else supplies the parameter
    pub fn with_default<T: Send + Sync + 'static>(self, value: T) -> Self {
        self.with_default_instance(instance(value))
    }

    pub fn with_default_instance(mut self, value: Instance) -> Self {
        self.default = Some(value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type identifier, qualifier included
    pub fn type_identifier(&self) -> Option<&str> {
        self.type_identifier.as_deref()
    }

    /// Binding name the declared type is looked up under
    pub fn binding_name(&self) -> Option<&str> {
        self.type_identifier.as_deref().map(strip_nullable)
    }

    pub fn default_value(&self) -> Option<&Instance> {
        self.default.as_ref()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

impl std::fmt::Debug for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("type_identifier", &self.type_identifier)
            .field("has_default", &self.has_default())
            .finish()
    }
}

/// Constructor function of a registered type
pub type Constructor = Arc<dyn Fn(&Arguments) -> Result<Instance, CoreError> + Send + Sync>;

/// Declarative constructor description standing in for runtime reflection
#[derive(Clone)]
pub struct TypeDescriptor {
    type_identifier: String,
    parameters: Vec<Parameter>,
    constructor: Constructor,
}

impl TypeDescriptor {
    /// Describe a type by hand
    pub fn new<F, T>(type_identifier: impl Into<String>, parameters: Vec<Parameter>, build: F) -> Self
    where
        F: Fn(&Arguments) -> Result<T, CoreError> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        let constructor: Constructor = Arc::new(move |args: &Arguments| {
            let value = build(args)?;
            Ok(instance(value))
        });

        Self {
            type_identifier: type_identifier.into(),
            parameters,
            constructor,
        }
    }

    /// Describe a [`Constructible`] type
    pub fn of<T: Constructible>() -> Self {
        Self::new(T::type_identifier(), T::parameters(), T::construct)
    }

    pub fn type_identifier(&self) -> &str {
        &self.type_identifier
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Build an instance from already resolved arguments
    pub fn construct(&self, args: &Arguments) -> Result<Instance, CoreError> {
        (self.constructor)(args)
    }
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_identifier", &self.type_identifier)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Types the registry can build from a type reference
///
/// Implementations list their constructor parameters in declaration order;
/// the registry resolves them and hands them to [`Constructible::construct`].
pub trait Constructible: Send + Sync + Sized + 'static {
    /// Identifier the type is registered under in the type catalog
    fn type_identifier() -> &'static str {
        type_identifier::<Self>()
    }

    /// Constructor parameters, in declaration order
    fn parameters() -> Vec<Parameter> {
        Vec::new()
    }

    fn construct(args: &Arguments) -> Result<Self, CoreError>;
}
