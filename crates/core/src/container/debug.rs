use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::container::binding::{Binding, ImplementationKind};
use crate::container::lifetime::Lifetime;
use crate::container::registry::Registry;
use crate::errors::CoreError;

/// Serializable snapshot of one binding
#[derive(Debug, Clone, Serialize)]
pub struct BindingInfo {
    pub name: String,
    pub id: Uuid,
    pub lifetime: Lifetime,
    pub implementation: ImplementationKind,
    pub cached: bool,
    pub resolving: bool,
    pub overrides: Vec<String>,
    pub fire_errors: bool,
    pub registered_at: DateTime<Utc>,
}

impl BindingInfo {
    pub(crate) fn from_binding(binding: &Binding, resolving: bool) -> Self {
        Self {
            name: binding.name().to_string(),
            id: binding.id(),
            lifetime: binding.lifetime(),
            implementation: binding.implementation().kind(),
            cached: binding.is_cached(),
            resolving,
            overrides: binding.overrides().keys(),
            fire_errors: binding.fire_errors(),
            registered_at: binding.registered_at(),
        }
    }
}

/// Registry diagnostics as a JSON document
#[derive(Debug, Serialize)]
struct RegistrySnapshot {
    bindings: Vec<BindingInfo>,
    types: usize,
    max_depth: usize,
    fire_errors: bool,
}

impl Registry {
    /// Dump the registry state as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, CoreError> {
        let snapshot = RegistrySnapshot {
            bindings: self.bindings_info()?,
            types: self.type_count(),
            max_depth: *self.config().get_max_depth(),
            fire_errors: *self.config().get_fire_errors(),
        };

        Ok(serde_json::to_string_pretty(&snapshot)?)
    }
}
