//! 模块启动示例
//!
//! 演示根提供者、模块私有提供者、多提供者聚合和 skip_self 装饰父级服务

use di_abstractions::{
    provide_class, provide_factory, provide_multi, provide_value, ClassRef, Dependency,
    DependencyDescriptor, FactoryFn, Injectable, ResolvedArgs, TokenResolver,
};
use infrastructure_common::Token;
use infrastructure_composition::{ApplicationBuilder, LoggingConfig, ModuleDef};
use std::sync::Arc;

/// 日志前缀服务
#[derive(Debug)]
struct Prefix(String);

/// 请求处理器
#[derive(Debug)]
struct Handler {
    prefix: Arc<Prefix>,
    plugins: Vec<Arc<&'static str>>,
}

impl Injectable for Handler {
    fn descriptor() -> DependencyDescriptor {
        DependencyDescriptor::new(["PREFIX", "PLUGINS"])
    }

    fn construct(args: &ResolvedArgs) -> anyhow::Result<Self> {
        Ok(Self {
            prefix: args.get::<Prefix>(0)?,
            plugins: args.all::<&'static str>(1)?,
        })
    }
}

/// 应用模块
#[derive(Debug)]
struct AppModule {
    handler: Arc<Handler>,
}

impl Injectable for AppModule {
    fn descriptor() -> DependencyDescriptor {
        DependencyDescriptor::new([Token::of::<Handler>()])
    }

    fn construct(args: &ResolvedArgs) -> anyhow::Result<Self> {
        Ok(Self {
            handler: args.get::<Handler>(0)?,
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut root_providers = vec![provide_value("PREFIX", Prefix("[root]".to_string()))];
    root_providers.extend(provide_multi(
        "PLUGINS",
        [provide_value("auth", "auth"), provide_value("metrics", "metrics")],
    ));

    // 模块用 skip_self 取到根级前缀后再包装一层
    let module = ModuleDef::injectable::<AppModule>()
        .named("app")
        .provider(provide_class(
            Token::of::<Handler>(),
            ClassRef::injectable::<Handler>(),
        ))
        .provider(provide_factory(
            "PREFIX",
            FactoryFn::new(|args| {
                let parent = args.get::<Prefix>(0)?;
                Ok(Prefix(format!("{}[app]", parent.0)))
            }),
            Some(DependencyDescriptor::new([Dependency::new("PREFIX").skip_self()])),
        ))
        .with_providers(provide_multi("PLUGINS", [provide_value("tracing", "tracing")]));

    let app = ApplicationBuilder::new()
        .with_logging(LoggingConfig::development())
        .with_providers(root_providers)
        .enable_validation(true)
        .bootstrap(module)?;

    if let Some(module) = app.module_as::<AppModule>() {
        println!("前缀: {}", module.handler.prefix.0);
        println!("插件: {:?}", module.handler.plugins);
    }

    let stats = app.module_injector().stats();
    println!(
        "模块注入器: {} 次解析, {} 次缓存命中",
        stats.resolutions, stats.cache_hits
    );

    let sibling = app.create_module_injector([]);
    println!(
        "兄弟注入器可见 Handler: {}",
        sibling.can_resolve(&Token::of::<Handler>())
    );

    Ok(())
}
