use crate::container::arguments::{Arguments, Instance, Overrides};
use crate::container::descriptor::Parameter;
use crate::errors::CoreError;

/// Trait for looking up nested dependencies during argument resolution
pub trait DependencyResolver {
    /// Check whether a binding is registered under `name`
    fn has(&self, name: &str) -> bool;

    /// Resolve the binding registered under `name`
    fn resolve(&self, name: &str, args: Option<&Overrides>) -> Result<Option<Instance>, CoreError>;
}

/// Where a parameter's value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterSource {
    Override,
    Binding,
    Default,
}

/// Supplies the arguments of a constructor or factory
///
/// For each parameter, in declaration order: an override keyed by the
/// parameter name wins; otherwise a binding registered under the declared
/// type (nullable qualifier stripped) is resolved; otherwise the declared
/// default is used. A parameter with none of these fails the resolution.
pub struct ParameterResolver;

impl ParameterResolver {
    /// Resolve `parameters` into an ordered argument list
    pub fn resolve<R>(
        resolver: &R,
        parameters: &[Parameter],
        overrides: &Overrides,
    ) -> Result<Arguments, CoreError>
    where
        R: DependencyResolver + ?Sized,
    {
        let mut resolved = Arguments::new();

        for parameter in parameters {
            let (value, source) = Self::resolve_parameter(resolver, parameter, overrides)?;
            tracing::trace!(
                parameter = parameter.name(),
                ?source,
                "resolved constructor parameter"
            );
            resolved.push(parameter.name(), value);
        }

        Ok(resolved)
    }

    fn resolve_parameter<R>(
        resolver: &R,
        parameter: &Parameter,
        overrides: &Overrides,
    ) -> Result<(Option<Instance>, ParameterSource), CoreError>
    where
        R: DependencyResolver + ?Sized,
    {
        if let Some(value) = overrides.get(parameter.name()) {
            return Ok((Some(value.clone()), ParameterSource::Override));
        }

        if let Some(binding) = parameter.binding_name() {
            if resolver.has(binding) {
                let value = resolver.resolve(binding, None)?;
                return Ok((value, ParameterSource::Binding));
            }
        }

        match parameter.default_value() {
            Some(default) => Ok((Some(default.clone()), ParameterSource::Default)),
            None => Err(CoreError::missing_parameter(parameter.name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::arguments::instance;
    use std::cell::RefCell;
    use std::collections::HashMap;

    // Mock resolver for testing
    struct MockResolver {
        services: HashMap<String, Option<Instance>>,
        requested: RefCell<Vec<String>>,
    }

    impl MockResolver {
        fn new() -> Self {
            Self {
                services: HashMap::new(),
                requested: RefCell::new(Vec::new()),
            }
        }

        fn register<T: Send + Sync + 'static>(&mut self, name: &str, value: T) {
            self.services.insert(name.to_string(), Some(instance(value)));
        }

        fn register_null(&mut self, name: &str) {
            self.services.insert(name.to_string(), None);
        }
    }

    impl DependencyResolver for MockResolver {
        fn has(&self, name: &str) -> bool {
            self.services.contains_key(name)
        }

        fn resolve(&self, name: &str, _args: Option<&Overrides>) -> Result<Option<Instance>, CoreError> {
            self.requested.borrow_mut().push(name.to_string());
            self.services
                .get(name)
                .cloned()
                .ok_or_else(|| CoreError::binding_not_found(name))
        }
    }

    #[test]
    fn test_override_wins_over_binding() {
        let mut resolver = MockResolver::new();
        resolver.register("Database", "bound".to_string());

        let parameters = vec![Parameter::new("db").with_type("Database")];
        let overrides = Overrides::new().with("db", "pinned".to_string());

        let args = ParameterResolver::resolve(&resolver, &parameters, &overrides).unwrap();

        assert_eq!(args.cloned::<String>("db").unwrap(), "pinned");
        assert!(resolver.requested.borrow().is_empty());
    }

    #[test]
    fn test_binding_then_default_then_missing() {
        let mut resolver = MockResolver::new();
        resolver.register("Config", 42u32);

        let parameters = vec![
            Parameter::new("config").with_type("?Config"),
            Parameter::new("name").with_type("Unbound").with_default("123".to_string()),
        ];

        let args = ParameterResolver::resolve(&resolver, &parameters, &Overrides::new()).unwrap();

        assert_eq!(args.names(), vec!["config", "name"]);
        assert_eq!(*args.get::<u32>("config").unwrap(), 42);
        assert_eq!(args.cloned::<String>("name").unwrap(), "123");
        assert_eq!(*resolver.requested.borrow(), vec!["Config".to_string()]);

        let missing = vec![Parameter::new("dsn").with_type("Unbound")];
        match ParameterResolver::resolve(&resolver, &missing, &Overrides::new()) {
            Err(CoreError::MissingParameterValue { parameter }) => assert_eq!(parameter, "dsn"),
            other => panic!("expected MissingParameterValue, got {:?}", other.map(|a| a.len())),
        }
    }

    #[test]
    fn test_null_binding_is_passed_through() {
        let mut resolver = MockResolver::new();
        resolver.register_null("Logger");

        let parameters = vec![Parameter::new("logger")
            .with_type("Logger")
            .with_default("fallback".to_string())];

        let args = ParameterResolver::resolve(&resolver, &parameters, &Overrides::new()).unwrap();
        assert!(args.is_null("logger"));
    }

    #[test]
    fn test_nested_failure_propagates() {
        struct FailingResolver;

        impl DependencyResolver for FailingResolver {
            fn has(&self, _name: &str) -> bool {
                true
            }

            fn resolve(&self, name: &str, _args: Option<&Overrides>) -> Result<Option<Instance>, CoreError> {
                Err(CoreError::cyclic_dependency(name))
            }
        }

        let parameters = vec![Parameter::new("a").with_type("A").with_default(1u8)];
        let result = ParameterResolver::resolve(&FailingResolver, &parameters, &Overrides::new());

        assert!(matches!(result, Err(CoreError::CyclicDependency { .. })));
    }
}
