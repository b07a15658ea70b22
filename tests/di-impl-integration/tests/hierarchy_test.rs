//! 注入器树的集成测试：覆盖、隔离、查找修饰符与端到端解析

use di_abstractions::{
    provide_class, provide_existing, provide_factory, provide_value, ClassRef, Dependency,
    DependencyDescriptor, FactoryFn, ResolveOptions, TokenResolver,
};
use di_impl::{DescriptorTable, Injector};
use infrastructure_common::{DependencyError, Token};
use std::sync::Arc;

fn token(name: &str) -> Token {
    Token::name(name)
}

#[test]
fn test_end_to_end_child_factory_uses_root_value() {
    let root = Injector::new([provide_value("A", 1_u32)]);
    let child = root.create_child([provide_factory(
        "B",
        FactoryFn::new(|args| Ok(*args.get::<u32>(0)? + 1)),
        Some(DependencyDescriptor::new(["A"])),
    )]);

    assert_eq!(*child.get_as::<u32>(&token("B")).unwrap(), 2);

    let error = root.get(&token("B")).unwrap_err();
    assert!(matches!(error, DependencyError::NoProviderFound { .. }));
    assert!(error.to_string().contains('B'));
}

#[test]
fn test_child_registration_overrides_parent() {
    let root = Injector::new([provide_value("URL", "prod")]);
    let child = root.create_child([provide_value("URL", "test")]);

    assert_eq!(*child.get_as::<&str>(&token("URL")).unwrap(), "test");
    assert_eq!(*root.get_as::<&str>(&token("URL")).unwrap(), "prod");
}

#[test]
fn test_siblings_are_isolated() {
    let root = Injector::new([]);
    let left = root.create_child([provide_value("ONLY_LEFT", 1_u8)]);
    let right = root.create_child([]);

    assert!(left.can_resolve(&token("ONLY_LEFT")));
    assert!(!right.can_resolve(&token("ONLY_LEFT")));
    assert!(right.get(&token("ONLY_LEFT")).is_err());
}

#[test]
fn test_self_only_ignores_ancestors() {
    let root = Injector::new([provide_value("X", 1_u32)]);
    let child = root.create_child([]);

    let error = child
        .get_with(&token("X"), &ResolveOptions::new().self_only())
        .unwrap_err();
    assert!(matches!(error, DependencyError::NoProviderFound { .. }));

    let absent = child
        .get_with(&token("X"), &ResolveOptions::new().self_only().optional())
        .unwrap();
    assert!(absent.is_absent());

    // 无修饰符时仍能从父级取到
    assert_eq!(*child.get_as::<u32>(&token("X")).unwrap(), 1);
}

#[test]
fn test_skip_self_returns_parent_provider() {
    let root = Injector::new([provide_value("LOGGER", "root")]);
    let child = root.create_child([provide_value("LOGGER", "child")]);

    let parent_logger = child
        .get_with(&token("LOGGER"), &ResolveOptions::new().skip_self())
        .unwrap()
        .downcast::<&str>(&token("LOGGER"))
        .unwrap();
    assert_eq!(*parent_logger, "root");
    assert_eq!(*child.get_as::<&str>(&token("LOGGER")).unwrap(), "child");
}

#[test]
fn test_skip_self_on_root_falls_back_to_self() {
    let root = Injector::new([provide_value("LOGGER", "root")]);
    let logger = root
        .get_with(&token("LOGGER"), &ResolveOptions::new().skip_self())
        .unwrap();
    assert_eq!(*logger.downcast::<&str>(&token("LOGGER")).unwrap(), "root");
}

#[test]
fn test_skip_self_dependency_decorates_parent_service() {
    let root = Injector::new([provide_value("PREFIX", "api".to_string())]);
    let child = root.create_child([provide_factory(
        "PREFIX",
        FactoryFn::new(|args| Ok(format!("{}/v2", args.get::<String>(0)?))),
        Some(DependencyDescriptor::new([Dependency::new("PREFIX").skip_self()])),
    )]);

    assert_eq!(child.get_as::<String>(&token("PREFIX")).unwrap().as_str(), "api/v2");
}

#[test]
fn test_optional_and_default_on_missing_token() {
    let injector = Injector::new([]);

    let absent = injector
        .get_with(&token("MISSING"), &ResolveOptions::new().optional())
        .unwrap();
    assert!(absent.is_absent());
    assert!(injector.get_optional::<u32>(&token("MISSING")).unwrap().is_none());

    let fallback = injector
        .get_with(&token("MISSING"), &ResolveOptions::new().with_default(42_u32))
        .unwrap();
    assert_eq!(*fallback.downcast::<u32>(&token("MISSING")).unwrap(), 42);

    // 默认值不写入缓存
    assert!(!injector.is_cached(&token("MISSING")));
}

#[test]
fn test_existing_alias_shares_instance() {
    struct ConsoleLogger;

    let injector = Injector::new([
        provide_class("CONSOLE", ClassRef::new(|_| Ok(ConsoleLogger))),
        provide_existing("LOGGER", "CONSOLE"),
    ]);

    let direct = injector.get_as::<ConsoleLogger>(&token("CONSOLE")).unwrap();
    let aliased = injector.get_as::<ConsoleLogger>(&token("LOGGER")).unwrap();
    assert!(Arc::ptr_eq(&direct, &aliased));
}

#[test]
fn test_alias_resolves_from_calling_injector() {
    let root = Injector::new([
        provide_value("IMPL", "root-impl"),
        provide_existing("SERVICE", "IMPL"),
    ]);
    let child = root.create_child([provide_value("IMPL", "child-impl")]);

    assert_eq!(*child.get_as::<&str>(&token("SERVICE")).unwrap(), "child-impl");
    assert_eq!(*root.get_as::<&str>(&token("SERVICE")).unwrap(), "root-impl");
}

#[test]
fn test_descriptor_table_supplies_class_dependencies() {
    struct Repository {
        url: Arc<String>,
    }

    let table = DescriptorTable::new();
    table.register_type::<Repository>(DependencyDescriptor::new(["DB_URL"]));

    let injector = Injector::builder()
        .descriptors(Arc::new(table))
        .provider(provide_value("DB_URL", "postgres://localhost".to_string()))
        .provider(provide_class(
            Token::of::<Repository>(),
            ClassRef::new(|args| Ok(Repository { url: args.get::<String>(0)? })),
        ))
        .build();

    let child = injector.create_child([]);
    let repository = child.get_as::<Repository>(&Token::of::<Repository>()).unwrap();
    assert_eq!(repository.url.as_str(), "postgres://localhost");
}

#[test]
fn test_named_factory_uses_descriptor_table() {
    let table = DescriptorTable::new().with("makeGreeting", DependencyDescriptor::new(["NAME"]));
    let injector = Injector::builder()
        .descriptors(Arc::new(table))
        .provider(provide_value("NAME", "world".to_string()))
        .provider(provide_factory(
            "GREETING",
            FactoryFn::named("makeGreeting", |args| {
                Ok(format!("hello {}", args.get::<String>(0)?))
            }),
            None,
        ))
        .build();

    assert_eq!(
        injector.get_as::<String>(&token("GREETING")).unwrap().as_str(),
        "hello world"
    );
}

#[test]
fn test_symbol_tokens_are_distinct_from_names() {
    let symbol = Token::symbol("CONFIG");
    let injector = Injector::new([
        provide_value(symbol.clone(), "from-symbol"),
        provide_value("CONFIG", "from-name"),
    ]);

    assert_eq!(*injector.get_as::<&str>(&symbol).unwrap(), "from-symbol");
    assert_eq!(*injector.get_as::<&str>(&token("CONFIG")).unwrap(), "from-name");
    assert!(injector.get(&Token::symbol("CONFIG")).is_err());
}

#[test]
fn test_type_mismatch_is_reported() {
    let injector = Injector::new([provide_value("PORT", 8080_u16)]);
    let error = injector.get_as::<String>(&token("PORT")).unwrap_err();
    assert!(matches!(error, DependencyError::TypeMismatch { .. }));
}

#[test]
fn test_host_modifier_resolves_like_plain_lookup() {
    let root = Injector::new([provide_value("URL", "prod"), provide_value("REGION", "eu")]);
    let child = root.create_child([provide_value("URL", "test")]);

    let url = child
        .get_with(&token("URL"), &ResolveOptions::new().host())
        .unwrap();
    assert!(url.ptr_eq(&child.get(&token("URL")).unwrap()));
    assert_eq!(*url.downcast::<&str>(&token("URL")).unwrap(), "test");

    let region = child
        .get_with(&token("REGION"), &ResolveOptions::new().host())
        .unwrap();
    assert_eq!(*region.downcast::<&str>(&token("REGION")).unwrap(), "eu");
}

#[test]
fn test_host_dependency_flag_is_inert() {
    let root = Injector::new([provide_value("A", 1_u32)]);
    let child = root.create_child([provide_factory(
        "B",
        FactoryFn::new(|args| Ok(*args.get::<u32>(0)? * 10)),
        Some(DependencyDescriptor::new([Dependency::new("A").host()])),
    )]);

    assert_eq!(*child.get_as::<u32>(&token("B")).unwrap(), 10);
}
