use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::CoreError;

/// Type-erased, shared handle to a resolved object
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Wrap a value into an [`Instance`]
pub fn instance<T: Send + Sync + 'static>(value: T) -> Instance {
    Arc::new(value)
}

/// Literal parameter values keyed by parameter name
#[derive(Clone, Default)]
pub struct Overrides {
    values: HashMap<String, Instance>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a literal value for the parameter `name`
    pub fn with<T: Send + Sync + 'static>(mut self, name: impl Into<String>, value: T) -> Self {
        self.values.insert(name.into(), instance(value));
        self
    }

    /// Add an already shared value for the parameter `name`
    pub fn with_instance(mut self, name: impl Into<String>, value: Instance) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn insert<T: Send + Sync + 'static>(&mut self, name: impl Into<String>, value: T) {
        self.values.insert(name.into(), instance(value));
    }

    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parameter names with an override, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl std::fmt::Debug for Overrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overrides")
            .field("keys", &self.keys())
            .finish()
    }
}

/// Ordered argument list handed to a constructor or factory
///
/// Each entry keeps the parameter name it was resolved for, so callables can
/// read their arguments either positionally or by name. A `None` value is an
/// argument that resolved to null (an explicit null binding).
#[derive(Clone, Default)]
pub struct Arguments {
    entries: Vec<(String, Option<Instance>)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: Option<Instance>) {
        self.entries.push((name.into(), value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parameter names in declaration order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Raw value for `name`; `None` if absent or null
    pub fn value(&self, name: &str) -> Option<&Instance> {
        self.entry(name).and_then(|value| value.as_ref())
    }

    /// Raw value at `index`; `None` if out of range or null
    pub fn value_at(&self, index: usize) -> Option<&Instance> {
        self.entries.get(index).and_then(|(_, value)| value.as_ref())
    }

    /// Whether the argument for `name` resolved to null
    pub fn is_null(&self, name: &str) -> bool {
        matches!(self.entry(name), Some(None))
    }

    /// Typed, shared access to a required argument
    pub fn get<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, CoreError> {
        self.optional::<T>(name)?
            .ok_or_else(|| CoreError::NullArgument {
                parameter: name.to_string(),
            })
    }

    /// Typed access to an argument that may have resolved to null
    pub fn optional<T: Send + Sync + 'static>(&self, name: &str) -> Result<Option<Arc<T>>, CoreError> {
        let value = self
            .entry(name)
            .ok_or_else(|| CoreError::missing_parameter(name))?;

        match value {
            None => Ok(None),
            Some(value) => value
                .clone()
                .downcast::<T>()
                .map(Some)
                .map_err(|_| CoreError::ArgumentType {
                    parameter: name.to_string(),
                    expected: std::any::type_name::<T>(),
                }),
        }
    }

    /// Owned copy of a required argument, convenient for literal values
    pub fn cloned<T: Clone + Send + Sync + 'static>(&self, name: &str) -> Result<T, CoreError> {
        self.get::<T>(name).map(|value| (*value).clone())
    }

    pub fn into_values(self) -> Vec<Option<Instance>> {
        self.entries.into_iter().map(|(_, value)| value).collect()
    }

    fn entry(&self, name: &str) -> Option<&Option<Instance>> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, value)| value)
    }
}

impl std::fmt::Debug for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries: Vec<(&str, bool)> = self
            .entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.is_some()))
            .collect();
        f.debug_struct("Arguments").field("entries", &entries).finish()
    }
}
