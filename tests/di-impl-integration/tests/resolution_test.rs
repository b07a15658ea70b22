//! 单例缓存、多提供者聚合、循环检测与并发解析的集成测试

use di_abstractions::{
    provide_class, provide_factory, provide_multi, provide_value, ClassRef, DependencyDescriptor,
    FactoryFn, InjectorConfig, Injectable, ResolvedArgs, TokenResolver,
};
use di_impl::Injector;
use infrastructure_common::{Configurable, DependencyError, Token};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Clock;

#[derive(Debug)]
struct Scheduler {
    clock: Arc<Clock>,
}

impl Injectable for Scheduler {
    fn descriptor() -> DependencyDescriptor {
        DependencyDescriptor::new([Token::of::<Clock>()])
    }

    fn construct(args: &ResolvedArgs) -> anyhow::Result<Self> {
        Ok(Self {
            clock: args.get::<Clock>(0)?,
        })
    }
}

fn counting_factory(counter: &Arc<AtomicUsize>) -> FactoryFn {
    let counter = Arc::clone(counter);
    FactoryFn::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Clock)
    })
}

#[test]
fn test_singleton_per_injector() {
    let built = Arc::new(AtomicUsize::new(0));
    let injector = Injector::new([
        provide_factory(Token::of::<Clock>(), counting_factory(&built), None),
        provide_class(Token::of::<Scheduler>(), ClassRef::injectable::<Scheduler>()),
    ]);

    let first = injector.get(&Token::of::<Clock>()).unwrap();
    let second = injector.get(&Token::of::<Clock>()).unwrap();
    assert!(first.ptr_eq(&second));

    let scheduler = injector.get_as::<Scheduler>(&Token::of::<Scheduler>()).unwrap();
    assert!(Arc::ptr_eq(
        &scheduler.clock,
        &injector.get_as::<Clock>(&Token::of::<Clock>()).unwrap()
    ));
    assert_eq!(built.load(Ordering::SeqCst), 1);

    let stats = injector.stats();
    assert_eq!(stats.resolutions, 2);
    assert!(stats.cache_hits >= 2);
}

#[test]
fn test_each_injector_caches_its_own_instances() {
    let built = Arc::new(AtomicUsize::new(0));
    let root = Injector::new([provide_factory("CLOCK", counting_factory(&built), None)]);
    let child = root.create_child([]);

    let from_root = root.get(&Token::name("CLOCK")).unwrap();
    let from_child = child.get(&Token::name("CLOCK")).unwrap();

    assert!(!from_root.ptr_eq(&from_child));
    assert_eq!(built.load(Ordering::SeqCst), 2);
    assert!(child.is_cached(&Token::name("CLOCK")));
}

#[test]
fn test_multi_providers_aggregate_nearest_first() {
    let root = Injector::new(provide_multi(
        "PLUGINS",
        [provide_value("a", "root-a"), provide_value("b", "root-b")],
    ));
    let child = root.create_child(provide_multi("PLUGINS", [provide_value("c", "child-c")]));

    let plugins: Vec<&str> = child
        .get_all::<&str>(&Token::name("PLUGINS"))
        .unwrap()
        .iter()
        .map(|plugin| **plugin)
        .collect();
    assert_eq!(plugins, ["child-c", "root-a", "root-b"]);

    let root_plugins = root.get_all::<&str>(&Token::name("PLUGINS")).unwrap();
    assert_eq!(root_plugins.len(), 2);
}

#[test]
fn test_single_value_is_not_a_multi_set() {
    let injector = Injector::new([provide_value("ONE", 1_u32)]);
    let resolution = injector.get(&Token::name("ONE")).unwrap();
    assert!(resolution.as_single().is_some());
    assert_eq!(resolution.instances().len(), 1);
}

#[test]
fn test_circular_dependency_names_chain() {
    let injector = Injector::new([
        provide_factory(
            "A",
            FactoryFn::new(|_| Ok(())),
            Some(DependencyDescriptor::new(["B"])),
        ),
        provide_factory(
            "B",
            FactoryFn::new(|_| Ok(())),
            Some(DependencyDescriptor::new(["A"])),
        ),
    ]);

    let error = injector.get(&Token::name("A")).unwrap_err();
    match &error {
        DependencyError::CircularDependency { dependency_chain } => {
            assert_eq!(dependency_chain, "A -> B -> A");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(injector.stats().cached_entries, 0);
}

#[test]
fn test_depth_limit_from_config() {
    let config = InjectorConfig::from_toml_str(
        r#"
        [injector]
        max_resolution_depth = 2
        "#,
    )
    .unwrap();

    let injector = Injector::builder()
        .config(config)
        .provider(provide_value("C", 0_u8))
        .provider(provide_factory(
            "B",
            FactoryFn::new(|_| Ok(())),
            Some(DependencyDescriptor::new(["C"])),
        ))
        .provider(provide_factory(
            "A",
            FactoryFn::new(|_| Ok(())),
            Some(DependencyDescriptor::new(["B"])),
        ))
        .build();

    let error = injector.get(&Token::name("A")).unwrap_err();
    assert!(matches!(
        error,
        DependencyError::ResolutionDepthExceeded { max_depth: 2, .. }
    ));
    assert!(injector.get(&Token::name("B")).is_ok());
}

#[test]
fn test_disabled_cycle_detection_falls_back_to_depth_limit() {
    let config = InjectorConfig {
        enable_circular_dependency_detection: false,
        max_resolution_depth: 16,
        ..InjectorConfig::default()
    };
    let injector = Injector::builder()
        .config(config)
        .provider(provide_factory(
            "A",
            FactoryFn::new(|_| Ok(())),
            Some(DependencyDescriptor::new(["B"])),
        ))
        .provider(provide_factory(
            "B",
            FactoryFn::new(|_| Ok(())),
            Some(DependencyDescriptor::new(["A"])),
        ))
        .build();

    let error = injector.get(&Token::name("A")).unwrap_err();
    assert!(matches!(
        error,
        DependencyError::ResolutionDepthExceeded { max_depth: 16, .. }
    ));
}

#[test]
fn test_failed_construction_is_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let injector = Injector::new([provide_factory(
        "FLAKY",
        FactoryFn::new(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                anyhow::bail!("首次连接失败");
            }
            Ok(7_u32)
        }),
        None,
    )]);

    assert!(matches!(
        injector.get(&Token::name("FLAKY")),
        Err(DependencyError::ConstructionFailure { .. })
    ));
    assert_eq!(*injector.get_as::<u32>(&Token::name("FLAKY")).unwrap(), 7);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_resolution_yields_one_cached_instance() {
    let injector = Injector::new([provide_class(
        Token::of::<Clock>(),
        ClassRef::new(|_| Ok(Clock)),
    )]);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let injector = Arc::clone(&injector);
            tokio::spawn(async move { injector.get_as::<Clock>(&Token::of::<Clock>()) })
        })
        .collect();

    let mut instances = Vec::new();
    for handle in handles {
        instances.push(handle.await.unwrap().unwrap());
    }

    let cached = injector.get_as::<Clock>(&Token::of::<Clock>()).unwrap();
    assert!(instances.iter().all(|instance| Arc::ptr_eq(instance, &cached)));
}
