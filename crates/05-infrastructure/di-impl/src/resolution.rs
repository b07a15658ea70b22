//! 令牌解析算法与实例构建
//!
//! 解析总是以调用 `get` 的注入器为准：子依赖、别名都从这个注入器重新解析，
//! 结果也写入这个注入器的缓存，而不是提供者所在注入器的缓存。

use crate::injector::{CacheKey, CacheSlot, Injector};
use di_abstractions::{
    DependencyDescriptor, Instance, LookupScope, ProviderKind, ProviderSpec, Resolution,
    ResolutionFrame, ResolveContext, ResolveOptions, ResolvedArgs, TokenResolver,
};
use infrastructure_common::{DependencyError, DependencyResult, Token};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// 单个作用域贡献的候选提供者
#[derive(Debug)]
pub(crate) struct Level {
    pub(crate) scope_id: Uuid,
    pub(crate) specs: Vec<ProviderSpec>,
}

impl CacheKey {
    /// 由候选层级确定缓存键；没有候选时不缓存
    pub(crate) fn for_levels(token: &Token, levels: &[Level]) -> Option<Self> {
        let nearest = levels.first()?;
        let is_multi = levels.iter().flat_map(|level| &level.specs).any(|spec| spec.multi);
        let slot = if is_multi {
            CacheSlot::Multi {
                nearest: nearest.scope_id,
                farthest: levels.last().map_or(nearest.scope_id, |level| level.scope_id),
            }
        } else {
            CacheSlot::Provider(nearest.scope_id)
        };
        Some(Self {
            token: token.clone(),
            slot,
        })
    }
}

impl Injector {
    pub(crate) fn resolve_token(
        &self,
        token: &Token,
        options: &ResolveOptions,
        context: &mut ResolveContext,
    ) -> DependencyResult<Resolution> {
        let levels = self.collect_levels(token, options.lookup());
        let key = CacheKey::for_levels(token, &levels);

        if let Some(key) = &key {
            let cached = self.cache.get(key).map(|entry| entry.value().clone());
            if let Some(cached) = cached {
                self.count(&self.counters.cache_hits);
                debug!("命中缓存: {} (作用域: {})", token, self.scope.name);
                return Ok(cached);
            }
        }

        self.count(&self.counters.resolutions);
        let frame = ResolutionFrame {
            scope_id: self.scope.id,
            token: token.clone(),
            origin: levels.first().map(|level| level.scope_id),
        };
        let result = context.push_frame(frame).and_then(|()| {
            let result = self.resolve_uncached(token, key, levels, options, context);
            context.pop_frame();
            result
        });

        if result.is_err() {
            self.count(&self.counters.resolution_errors);
        }
        result
    }

    fn resolve_uncached(
        &self,
        token: &Token,
        key: Option<CacheKey>,
        levels: Vec<Level>,
        options: &ResolveOptions,
        context: &mut ResolveContext,
    ) -> DependencyResult<Resolution> {
        let specs: Vec<ProviderSpec> = levels.into_iter().flat_map(|level| level.specs).collect();
        debug!(
            "解析令牌: {} (作用域: {}, 查找范围: {:?}, 候选: {})",
            token,
            self.scope.name,
            options.lookup(),
            specs.len()
        );

        let Some(key) = key else {
            if let Some(default_value) = &options.default_value {
                return Ok(Resolution::Single(Arc::clone(default_value)));
            }
            if options.flags.optional {
                return Ok(Resolution::Absent);
            }
            return Err(DependencyError::no_provider(token));
        };

        if let CacheSlot::Multi { .. } = key.slot {
            let mut instances: Vec<Instance> = Vec::with_capacity(specs.len());
            for spec in &specs {
                instances.extend(self.instantiate(spec, context)?.instances());
            }
            return Ok(self.store(key, Resolution::Multi(instances)));
        }

        let resolution = self.instantiate(&specs[0], context)?;
        Ok(self.store(key, resolution))
    }

    /// 首次写入生效；并发下后到者返回已缓存的值
    fn store(&self, key: CacheKey, resolution: Resolution) -> Resolution {
        self.cache.entry(key).or_insert(resolution).value().clone()
    }

    /// 按查找范围收集候选提供者，最近的作用域在前，只保留有注册的层级
    pub(crate) fn collect_levels(&self, token: &Token, lookup: LookupScope) -> Vec<Level> {
        let mut levels = Vec::new();
        let mut push = |injector: &Injector| {
            let specs = injector.registry.get(token);
            if !specs.is_empty() {
                levels.push(Level {
                    scope_id: injector.scope.id,
                    specs: specs.to_vec(),
                });
            }
        };

        match lookup {
            LookupScope::SelfOnly => push(self),
            // 只有根注入器才回退到本级；父注入器已释放时没有候选
            LookupScope::SkipSelf => match (&self.parent, self.parent()) {
                (None, _) => push(self),
                (Some(_), Some(parent)) => push(parent.as_ref()),
                (Some(_), None) => {
                    warn!("父注入器已释放，skip_self 查找 {} 没有候选", token);
                }
            },
            LookupScope::Chain => {
                push(self);
                let mut current = self.parent();
                while let Some(injector) = current {
                    push(injector.as_ref());
                    current = injector.parent();
                }
            }
        }
        levels
    }

    /// 按查找范围收集候选提供者，展平为列表
    pub(crate) fn collect_providers(&self, token: &Token, lookup: LookupScope) -> Vec<ProviderSpec> {
        self.collect_levels(token, lookup)
            .into_iter()
            .flat_map(|level| level.specs)
            .collect()
    }

    /// 构建单个提供者
    fn instantiate(
        &self,
        spec: &ProviderSpec,
        context: &mut ResolveContext,
    ) -> DependencyResult<Resolution> {
        let Some(kind) = &spec.kind else {
            return Err(DependencyError::InvalidProviderSpec {
                token: spec.token.clone(),
            });
        };

        match kind {
            ProviderKind::Value(value) => Ok(Resolution::Single(Arc::clone(value))),
            ProviderKind::Existing(alias) => {
                debug!("别名解析: {} -> {}", spec.token, alias);
                self.resolve(alias, &ResolveOptions::default(), context)
            }
            ProviderKind::Class(class) => {
                let descriptor = self.descriptor_for(kind);
                let args = self.resolve_args(&spec.token, &descriptor, context)?;
                debug!("构造类型: {} ({})", spec.token, class.type_info().name);
                class
                    .construct(&args)
                    .map(Resolution::Single)
                    .map_err(|error| construction_error(&spec.token, error))
            }
            ProviderKind::Factory { factory, .. } => {
                let descriptor = self.descriptor_for(kind);
                let args = self.resolve_args(&spec.token, &descriptor, context)?;
                debug!("调用工厂: {} ({})", spec.token, factory.identity());
                factory
                    .invoke(&args)
                    .map(Resolution::Single)
                    .map_err(|error| construction_error(&spec.token, error))
            }
        }
    }

    /// 提供者的依赖描述符
    ///
    /// 类：内联描述符优先，其次描述符表；工厂：显式依赖、内联描述符、描述符表依次回退。
    /// 别名视为对目标令牌的单个依赖，值没有依赖。
    pub(crate) fn descriptor_for(&self, kind: &ProviderKind) -> DependencyDescriptor {
        match kind {
            ProviderKind::Value(_) => DependencyDescriptor::empty(),
            ProviderKind::Existing(alias) => DependencyDescriptor::new([alias.clone()]),
            ProviderKind::Class(class) => class
                .descriptor()
                .cloned()
                .or_else(|| self.descriptors.descriptor(&class.token()))
                .unwrap_or_default(),
            ProviderKind::Factory { factory, deps } => deps
                .clone()
                .or_else(|| factory.descriptor().cloned())
                .or_else(|| self.descriptors.descriptor(factory.identity()))
                .unwrap_or_default(),
        }
    }

    /// 按参数顺序从左到右解析依赖
    fn resolve_args(
        &self,
        target: &Token,
        descriptor: &DependencyDescriptor,
        context: &mut ResolveContext,
    ) -> DependencyResult<ResolvedArgs> {
        let params = descriptor
            .iter()
            .map(|dependency| {
                let options = ResolveOptions::from_flags(dependency.flags);
                let resolution = self.resolve(&dependency.token, &options, context)?;
                Ok((dependency.token.clone(), resolution))
            })
            .collect::<DependencyResult<Vec<_>>>()?;

        Ok(ResolvedArgs::new(target.clone(), params))
    }
}

/// 依赖错误原样传播，其余错误包装为构建失败
fn construction_error(token: &Token, error: anyhow::Error) -> DependencyError {
    match error.downcast::<DependencyError>() {
        Ok(dependency_error) => dependency_error,
        Err(source) => DependencyError::ConstructionFailure {
            token: token.clone(),
            source: source.into(),
        },
    }
}
