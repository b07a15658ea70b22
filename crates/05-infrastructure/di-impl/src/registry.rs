//! 提供者注册表实现

use di_abstractions::ProviderSpec;
use infrastructure_common::Token;
use std::collections::HashMap;
use tracing::debug;

/// 单个作用域的提供者注册表
///
/// 普通提供者按令牌整体替换，后注册的生效；多提供者在同一令牌下按注册顺序累积。
/// 普通提供者与多提供者之间同样是后注册者替换先注册者。
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: HashMap<Token, Vec<ProviderSpec>>,
}

impl ProviderRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 按声明顺序注册一组提供者
    pub fn from_specs<I>(specs: I) -> Self
    where
        I: IntoIterator<Item = ProviderSpec>,
    {
        let mut registry = Self::new();
        for spec in specs {
            registry.register(spec);
        }
        registry
    }

    /// 注册提供者
    pub fn register(&mut self, spec: ProviderSpec) {
        let entry = self.providers.entry(spec.token.clone()).or_default();

        if spec.multi && entry.iter().all(|existing| existing.multi) {
            entry.push(spec);
            return;
        }

        if !entry.is_empty() {
            debug!(
                "覆盖提供者: {} ({} -> {})",
                spec.token,
                entry.last().map_or("none", ProviderSpec::kind_name),
                spec.kind_name()
            );
        }
        entry.clear();
        entry.push(spec);
    }

    /// 令牌在本级注册的提供者，按注册顺序
    pub fn get(&self, token: &Token) -> &[ProviderSpec] {
        self.providers.get(token).map(Vec::as_slice).unwrap_or_default()
    }

    /// 本级是否注册了令牌
    pub fn contains(&self, token: &Token) -> bool {
        self.providers.contains_key(token)
    }

    /// 已注册令牌数量
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// 所有已注册令牌
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.providers.keys()
    }
}
