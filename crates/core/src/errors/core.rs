use crate::config::ConfigError;
use thiserror::Error;

/// Core error type for the binder container
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Binding \"{name}\" not found")]
    BindingNotFound { name: String },

    #[error("Cyclic dependency detected while resolving '{name}'")]
    CyclicDependency { name: String },

    #[error("Arguments can't be passed to singleton binding '{name}'")]
    InvalidArguments { name: String },

    #[error("No parameter value for '{parameter}' given")]
    MissingParameterValue { parameter: String },

    #[error("Type '{type_name}' is not registered as constructible")]
    UnknownType { type_name: String },

    #[error("Parameter '{parameter}' is not of the expected type {expected}")]
    ArgumentType {
        parameter: String,
        expected: &'static str,
    },

    #[error("Parameter '{parameter}' resolved to null")]
    NullArgument { parameter: String },

    #[error("Binding '{name}' resolved to null")]
    NullInstance { name: String },

    #[error("Binding '{name}' does not hold an instance of {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },

    #[error("Resolution depth limit of {depth} exceeded at '{name}'")]
    DepthExceeded { name: String, depth: usize },

    #[error("Construction of '{type_name}' failed: {source}")]
    ConstructionFailed {
        type_name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Can't resolve '{name}' ({source})")]
    ResolutionFailed {
        name: String,
        source: Box<CoreError>,
    },

    #[error("Lock error on resource: {resource}")]
    LockError { resource: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a new binding not found error
    pub fn binding_not_found(name: impl Into<String>) -> Self {
        Self::BindingNotFound { name: name.into() }
    }

    /// Create a new cyclic dependency error
    pub fn cyclic_dependency(name: impl Into<String>) -> Self {
        Self::CyclicDependency { name: name.into() }
    }

    /// Create a new invalid arguments error
    pub fn invalid_arguments(name: impl Into<String>) -> Self {
        Self::InvalidArguments { name: name.into() }
    }

    /// Create a new missing parameter value error
    pub fn missing_parameter(parameter: impl Into<String>) -> Self {
        Self::MissingParameterValue {
            parameter: parameter.into(),
        }
    }

    /// Wrap an error raised by a constructor or factory
    pub fn construction_failed(
        type_name: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ConstructionFailed {
            type_name: type_name.into(),
            source: source.into(),
        }
    }

    /// Wrap a failure that happened while resolving `name`
    pub fn resolution_failed(name: impl Into<String>, source: CoreError) -> Self {
        Self::ResolutionFailed {
            name: name.into(),
            source: Box::new(source),
        }
    }

    pub(crate) fn lock(resource: impl Into<String>) -> Self {
        Self::LockError {
            resource: resource.into(),
        }
    }

    /// Innermost error of a chain of `ResolutionFailed` wrappers
    pub fn root_cause(&self) -> &CoreError {
        let mut current = self;
        while let Self::ResolutionFailed { source, .. } = current {
            current = source.as_ref();
        }
        current
    }

    /// Names of the bindings the error travelled through, outermost first
    pub fn resolution_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self;
        while let Self::ResolutionFailed { name, source } = current {
            path.push(name.as_str());
            current = source.as_ref();
        }
        path
    }

    /// Check if the root cause is a missing binding
    pub fn is_binding_not_found(&self) -> bool {
        matches!(self.root_cause(), Self::BindingNotFound { .. })
    }

    /// Check if the root cause is a dependency cycle
    pub fn is_cyclic_dependency(&self) -> bool {
        matches!(self.root_cause(), Self::CyclicDependency { .. })
    }

    /// Check if the root cause is an arguments/singleton conflict
    pub fn is_invalid_arguments(&self) -> bool {
        matches!(self.root_cause(), Self::InvalidArguments { .. })
    }

    /// Check if the root cause is an unsatisfiable parameter
    pub fn is_missing_parameter(&self) -> bool {
        matches!(self.root_cause(), Self::MissingParameterValue { .. })
    }
}
