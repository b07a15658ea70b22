//! 注入器实现
//!
//! 注入器是作用域树上的节点：独占自己的注册表和单例缓存，只以弱引用指向父注入器。

use crate::descriptors::DescriptorTable;
use crate::registry::ProviderRegistry;
use di_abstractions::{
    DescriptorSource, InjectorConfig, InjectorStats, LookupScope, ProviderSpec, Resolution,
    ResolveContext, ResolveOptions, TokenResolver,
};
use dashmap::DashMap;
use infrastructure_common::{DependencyResult, Scope, Token};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 缓存槽：按胜出提供者的来源区分，而不是按查找修饰符
///
/// 不同修饰符选中同一个提供者时共享同一个单例。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum CacheSlot {
    /// 单个提供者，记录提供它的作用域
    Provider(Uuid),
    /// 多提供者集合，记录收集到的最近和最远作用域
    Multi { nearest: Uuid, farthest: Uuid },
}

/// 缓存键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    pub(crate) token: Token,
    pub(crate) slot: CacheSlot,
}

/// 解析计数
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) resolutions: AtomicUsize,
    pub(crate) cache_hits: AtomicUsize,
    pub(crate) resolution_errors: AtomicUsize,
}

/// 注入器
pub struct Injector {
    pub(crate) scope: Scope,
    pub(crate) registry: ProviderRegistry,
    pub(crate) cache: DashMap<CacheKey, Resolution>,
    pub(crate) parent: Option<Weak<Injector>>,
    pub(crate) descriptors: Arc<dyn DescriptorSource>,
    pub(crate) config: InjectorConfig,
    pub(crate) counters: Counters,
}

impl Injector {
    /// 创建根注入器
    pub fn new<I>(providers: I) -> Arc<Self>
    where
        I: IntoIterator<Item = ProviderSpec>,
    {
        Self::builder().providers(providers).build()
    }

    /// 创建以 `parent` 为父的注入器
    pub fn with_parent<I>(providers: I, parent: &Arc<Self>) -> Arc<Self>
    where
        I: IntoIterator<Item = ProviderSpec>,
    {
        Self::builder().providers(providers).parent(parent).build()
    }

    /// 注入器构建器
    pub fn builder() -> InjectorBuilder {
        InjectorBuilder::new()
    }

    /// 创建子注入器，子注入器的提供者对父注入器和兄弟注入器不可见
    pub fn create_child<I>(self: &Arc<Self>, providers: I) -> Arc<Self>
    where
        I: IntoIterator<Item = ProviderSpec>,
    {
        Self::with_parent(providers, self)
    }

    /// 创建具名子注入器
    pub fn create_named_child<I>(self: &Arc<Self>, name: impl Into<String>, providers: I) -> Arc<Self>
    where
        I: IntoIterator<Item = ProviderSpec>,
    {
        Self::builder()
            .name(name)
            .providers(providers)
            .parent(self)
            .build()
    }

    /// 父注入器；父注入器已被释放时返回 `None`
    pub fn parent(&self) -> Option<Arc<Self>> {
        let parent = self.parent.as_ref()?;
        let upgraded = parent.upgrade();
        if upgraded.is_none() {
            warn!("父注入器已释放，作用域 {} 的查找止于本级", self.scope.name);
        }
        upgraded
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn config(&self) -> &InjectorConfig {
        &self.config
    }

    /// 描述符来源（子注入器共享）
    pub fn descriptors(&self) -> &Arc<dyn DescriptorSource> {
        &self.descriptors
    }

    /// 本级是否注册了令牌
    pub fn has_provider(&self, token: &Token) -> bool {
        self.registry.contains(token)
    }

    /// 本级已注册的令牌
    pub fn registered_tokens(&self) -> Vec<Token> {
        self.registry.tokens().cloned().collect()
    }

    /// 本级是否已缓存令牌（无修饰符查找）
    pub fn is_cached(&self, token: &Token) -> bool {
        let levels = self.collect_levels(token, LookupScope::Chain);
        CacheKey::for_levels(token, &levels).is_some_and(|key| self.cache.contains_key(&key))
    }

    /// 统计信息快照
    pub fn stats(&self) -> InjectorStats {
        InjectorStats {
            registered_providers: self.registry.len(),
            cached_entries: self.cache.len(),
            resolutions: self.counters.resolutions.load(Ordering::Relaxed),
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
            resolution_errors: self.counters.resolution_errors.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn count(&self, counter: &AtomicUsize) {
        if self.config.enable_statistics {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl std::fmt::Debug for Injector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injector")
            .field("scope", &self.scope.name)
            .field("providers", &self.registry.len())
            .field("cached", &self.cache.len())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

impl TokenResolver for Injector {
    fn resolve(
        &self,
        token: &Token,
        options: &ResolveOptions,
        context: &mut ResolveContext,
    ) -> DependencyResult<Resolution> {
        self.resolve_token(token, options, context)
    }

    fn get_with(&self, token: &Token, options: &ResolveOptions) -> DependencyResult<Resolution> {
        let mut context = ResolveContext::new(&self.config);
        self.resolve_token(token, options, &mut context)
    }

    fn can_resolve(&self, token: &Token) -> bool {
        !self.collect_providers(token, LookupScope::Chain).is_empty()
    }
}

/// 注入器构建器
#[derive(Default)]
pub struct InjectorBuilder {
    name: Option<String>,
    providers: Vec<ProviderSpec>,
    parent: Option<Arc<Injector>>,
    descriptors: Option<Arc<dyn DescriptorSource>>,
    config: Option<InjectorConfig>,
}

impl InjectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 作用域名称
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 追加一个提供者
    pub fn provider(mut self, spec: ProviderSpec) -> Self {
        self.providers.push(spec);
        self
    }

    /// 追加一组提供者
    pub fn providers<I>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = ProviderSpec>,
    {
        self.providers.extend(specs);
        self
    }

    pub fn parent(mut self, parent: &Arc<Injector>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// 描述符来源；未指定时继承父注入器，根注入器使用空表
    pub fn descriptors(mut self, descriptors: Arc<dyn DescriptorSource>) -> Self {
        self.descriptors = Some(descriptors);
        self
    }

    /// 配置；未指定时继承父注入器，根注入器使用默认配置
    pub fn config(mut self, config: InjectorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 构建注入器
    pub fn build(self) -> Arc<Injector> {
        let registry = ProviderRegistry::from_specs(self.providers);

        let injector = match self.parent {
            Some(parent) => {
                let scope = parent
                    .scope
                    .child(self.name.unwrap_or_else(|| format!("child{}", parent.scope.depth + 1)));
                debug!("创建子注入器: {} ({} 个提供者)", scope.name, registry.len());
                Injector {
                    scope,
                    registry,
                    cache: DashMap::new(),
                    parent: Some(Arc::downgrade(&parent)),
                    descriptors: self
                        .descriptors
                        .unwrap_or_else(|| Arc::clone(&parent.descriptors)),
                    config: self.config.unwrap_or_else(|| parent.config.clone()),
                    counters: Counters::default(),
                }
            }
            None => {
                let scope = self.name.map_or_else(Scope::root, Scope::new);
                info!("创建根注入器: {} ({} 个提供者)", scope.name, registry.len());
                Injector {
                    scope,
                    registry,
                    cache: DashMap::new(),
                    parent: None,
                    descriptors: self
                        .descriptors
                        .unwrap_or_else(|| Arc::new(DescriptorTable::new())),
                    config: self.config.unwrap_or_default(),
                    counters: Counters::default(),
                }
            }
        };

        Arc::new(injector)
    }
}
