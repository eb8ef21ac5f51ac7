use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::container::descriptor::{Constructible, TypeDescriptor};
use crate::errors::CoreError;

/// Table of constructible types, keyed by type identifier
#[derive(Debug, Default)]
pub struct TypeCatalog {
    types: RwLock<HashMap<String, Arc<TypeDescriptor>>>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a [`Constructible`] type under its identifier
    pub fn register<T: Constructible>(&self) -> Result<(), CoreError> {
        self.insert(TypeDescriptor::of::<T>())
    }

    /// Register a hand-built descriptor, replacing any previous one
    pub fn insert(&self, descriptor: TypeDescriptor) -> Result<(), CoreError> {
        let mut types = self
            .types
            .write()
            .map_err(|_| CoreError::lock("type_catalog"))?;

        tracing::debug!(
            type_identifier = descriptor.type_identifier(),
            parameters = descriptor.parameters().len(),
            "registered constructible type"
        );
        types.insert(descriptor.type_identifier().to_string(), Arc::new(descriptor));
        Ok(())
    }

    pub fn get(&self, type_identifier: &str) -> Result<Option<Arc<TypeDescriptor>>, CoreError> {
        let types = self
            .types
            .read()
            .map_err(|_| CoreError::lock("type_catalog"))?;
        Ok(types.get(type_identifier).cloned())
    }

    pub fn contains(&self, type_identifier: &str) -> bool {
        self.types
            .read()
            .map(|types| types.contains_key(type_identifier))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.types.read().map(|types| types.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) -> Result<(), CoreError> {
        self.types
            .write()
            .map_err(|_| CoreError::lock("type_catalog"))?
            .clear();
        Ok(())
    }
}
