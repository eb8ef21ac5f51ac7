use std::error::Error;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use binder_core::container::{Arguments, Binding, Factory, Implementation, Overrides, Parameter, Registry};
use binder_core::{CoreError, RegistryConfigBuilder};

#[derive(Debug)]
struct Node {
    label: String,
}

fn node_factory(dependency: &str, label: &'static str) -> Factory {
    Factory::new(
        vec![Parameter::new("dependency").with_type(dependency)],
        move |_: &Arguments| {
            Ok(Node {
                label: label.to_string(),
            })
        },
    )
}

#[test]
fn test_cycle_is_detected_and_state_is_reset() {
    let registry = Registry::new();
    registry
        .bind_multiple("A", Implementation::factory(node_factory("B", "a")), Overrides::new())
        .unwrap()
        .bind_multiple("B", Implementation::factory(node_factory("A", "b")), Overrides::new())
        .unwrap();

    let error = registry.resolve("A", None).unwrap_err();
    assert!(error.is_cyclic_dependency());
    assert_eq!(error.resolution_path(), vec!["A", "B", "A"]);
    assert!(matches!(error.root_cause(), CoreError::CyclicDependency { name } if name == "A"));

    assert!(!registry.is_resolving("A"));
    assert!(!registry.is_resolving("B"));

    // Breaking the cycle makes both resolvable again
    registry
        .bind_singleton("B", Implementation::instance(Node { label: "fixed".to_string() }), Overrides::new())
        .unwrap();
    let a = registry.resolve_as::<Node>("A").unwrap();
    assert_eq!(a.label, "a");
    assert_eq!(registry.resolve_as::<Node>("B").unwrap().label, "fixed");
}

#[test]
fn test_self_dependency_is_a_cycle() {
    let registry = Registry::new();
    registry
        .bind_singleton("Loop", Implementation::factory(node_factory("Loop", "loop")), Overrides::new())
        .unwrap();

    assert!(registry.resolve("Loop", None).unwrap_err().is_cyclic_dependency());
    assert!(!registry.is_resolving("Loop"));
    assert!(!registry.binding("Loop").unwrap().is_cached());
}

#[test]
fn test_silent_binding_does_not_affect_unrelated_bindings() {
    let registry = Registry::new();
    registry
        .register_binding(
            Binding::multiple("Quiet", Implementation::type_ref("Unregistered")).with_fire_errors(false),
        )
        .unwrap()
        .bind_multiple("Loud", Implementation::type_ref("Unregistered"), Overrides::new())
        .unwrap();

    assert!(registry.resolve("Quiet", None).unwrap().is_none());
    let error = registry.resolve("Loud", None).unwrap_err();
    assert!(matches!(error.root_cause(), CoreError::UnknownType { type_name } if type_name == "Unregistered"));
}

#[test]
fn test_silent_dependency_yields_null_inside_a_loud_graph() {
    let registry = Registry::new();
    registry
        .register_binding(
            Binding::multiple("Q", Implementation::type_ref("Unregistered")).with_fire_errors(false),
        )
        .unwrap()
        .bind_multiple(
            "L",
            Implementation::factory(Factory::new(
                vec![Parameter::new("q").with_type("Q")],
                |args: &Arguments| Ok(args.is_null("q")),
            )),
            Overrides::new(),
        )
        .unwrap()
        .bind_multiple(
            "Strict",
            Implementation::factory(Factory::new(
                vec![Parameter::new("q").with_type("Q"), Parameter::new("dsn")],
                |args: &Arguments| args.cloned::<String>("dsn"),
            )),
            Overrides::new(),
        )
        .unwrap();

    assert!(*registry.resolve_as::<bool>("L").unwrap());

    // The swallowed dependency does not mask a failure elsewhere in the graph
    let error = registry.resolve("Strict", None).unwrap_err();
    assert_eq!(error.resolution_path(), vec!["Strict"]);
    match error.root_cause() {
        CoreError::MissingParameterValue { parameter } => assert_eq!(parameter, "dsn"),
        other => panic!("unexpected root cause: {other}"),
    }
}

#[test]
fn test_factory_failure_is_kept_as_nested_cause() {
    let registry = Registry::new();
    registry
        .bind_singleton(
            "F",
            Implementation::factory(Factory::from_fn(|| -> Result<Node, CoreError> {
                Err(CoreError::construction_failed(
                    "F",
                    io::Error::new(io::ErrorKind::Other, "disk on fire"),
                ))
            })),
            Overrides::new(),
        )
        .unwrap();

    let error = registry.resolve("F", None).unwrap_err();
    assert!(matches!(error, CoreError::ResolutionFailed { ref name, .. } if name == "F"));
    assert_eq!(
        error.to_string(),
        "Can't resolve 'F' (Construction of 'F' failed: disk on fire)"
    );

    let root = error.root_cause();
    assert!(matches!(root, CoreError::ConstructionFailed { type_name, .. } if type_name == "F"));
    assert!(error.source().is_some());

    let cause = root.source().expect("construction failure keeps its cause");
    assert_eq!(cause.to_string(), "disk on fire");
    assert_eq!(
        cause.downcast_ref::<io::Error>().map(io::Error::kind),
        Some(io::ErrorKind::Other)
    );

    // A failed singleton is not cached
    assert!(!registry.binding("F").unwrap().is_cached());
}

#[test]
fn test_override_precedence() {
    let registry = Registry::new();
    registry
        .bind_singleton("Dsn", Implementation::instance("from-binding".to_string()), Overrides::new())
        .unwrap();

    let factory = Factory::new(
        vec![Parameter::new("dsn").with_type("Dsn").with_default("from-default".to_string())],
        |args: &Arguments| args.cloned::<String>("dsn"),
    );
    registry
        .bind_multiple(
            "Pinned",
            Implementation::factory(factory.clone()),
            Overrides::new().with("dsn", "from-override".to_string()),
        )
        .unwrap()
        .bind_multiple("Bound", Implementation::factory(factory.clone()), Overrides::new())
        .unwrap();

    assert_eq!(*registry.resolve_as::<String>("Pinned").unwrap(), "from-override");
    assert_eq!(*registry.resolve_as::<String>("Bound").unwrap(), "from-binding");

    // Call-site args replace the stored overrides wholesale
    let args = Overrides::new().with("dsn", "from-call".to_string());
    assert_eq!(
        *registry.resolve_with_as::<String>("Pinned", Some(&args)).unwrap(),
        "from-call"
    );

    registry.clear().unwrap();
    registry
        .bind_multiple("Defaulted", Implementation::factory(factory), Overrides::new())
        .unwrap();
    assert_eq!(*registry.resolve_as::<String>("Defaulted").unwrap(), "from-default");
}

#[test]
fn test_args_on_singleton_are_rejected_unwrapped() {
    let registry = Registry::new();
    registry
        .bind_singleton("Single", Implementation::instance(1u8), Overrides::new())
        .unwrap();

    let args = Overrides::new().with("x", 1u8);
    let error = registry.resolve("Single", Some(&args)).unwrap_err();
    assert!(matches!(error, CoreError::InvalidArguments { ref name } if name == "Single"));
}

#[test]
fn test_transient_instances_are_distinct() {
    let registry = Registry::new();
    registry
        .bind_multiple(
            "Node",
            Implementation::factory(Factory::from_fn(|| Ok(Node { label: "n".to_string() }))),
            Overrides::new(),
        )
        .unwrap();

    let first = registry.resolve_as::<Node>("Node").unwrap();
    let second = registry.resolve_as::<Node>("Node").unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn test_clear_removes_everything() {
    let registry = Registry::new();
    for name in ["One", "Two", "Three"] {
        registry
            .bind_multiple(name, Implementation::null(), Overrides::new())
            .unwrap();
    }

    registry.clear().unwrap();

    for name in ["One", "Two", "Three"] {
        assert!(!registry.has(name));
        assert!(matches!(
            registry.resolve(name, None),
            Err(CoreError::BindingNotFound { .. })
        ));
    }
    assert!(registry.is_empty());
}

#[test]
fn test_depth_limit() {
    let config = RegistryConfigBuilder::new().max_depth(3).build_config().unwrap();
    let registry = Registry::with_config(config);
    registry
        .bind_multiple("L0", Implementation::instance(0u8), Overrides::new())
        .unwrap();
    for level in 1..=4 {
        registry
            .bind_multiple(
                format!("L{level}"),
                Implementation::factory(Factory::new(
                    vec![Parameter::new("below").with_type(format!("L{}", level - 1))],
                    |_: &Arguments| Ok(()),
                )),
                Overrides::new(),
            )
            .unwrap();
    }

    assert!(registry.resolve("L2", None).is_ok());
    let error = registry.resolve("L4", None).unwrap_err();
    assert!(matches!(error.root_cause(), CoreError::DepthExceeded { depth: 3, .. }));
}

#[test]
fn test_concurrent_singleton_is_built_once() {
    let registry = Arc::new(Registry::new());
    let built = Arc::new(AtomicUsize::new(0));

    let counter = built.clone();
    registry
        .bind_singleton(
            "Slow",
            Implementation::factory(Factory::from_fn(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(20));
                Ok(Node { label: "slow".to_string() })
            })),
            Overrides::new(),
        )
        .unwrap();

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                registry.resolve_as::<Node>("Slow").unwrap()
            })
        })
        .collect();

    let nodes: Vec<Arc<Node>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(built.load(Ordering::SeqCst), 1);
    assert!(nodes.iter().all(|node| Arc::ptr_eq(node, &nodes[0])));
    assert!(!registry.is_resolving("Slow"));
}

#[test]
fn test_concurrent_transients_resolve_in_parallel_graphs() {
    let registry = Arc::new(Registry::new());
    registry
        .bind_singleton("Shared", Implementation::instance(7u32), Overrides::new())
        .unwrap()
        .bind_multiple(
            "Worker",
            Implementation::factory(Factory::new(
                vec![Parameter::new("shared").with_type("Shared")],
                |args: &Arguments| Ok(*args.get::<u32>("shared")? * 2),
            )),
            Overrides::new(),
        )
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = registry.clone();
            thread::spawn(move || {
                (0..25)
                    .map(|_| *registry.resolve_as::<u32>("Worker").unwrap())
                    .sum::<u32>()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 25 * 14);
    }
}
