//! 令牌解析接口
//!
//! 定义解析结果、解析选项、构造参数以及用于检测循环依赖的解析上下文。

use crate::config::InjectorConfig;
use crate::descriptor::{InjectFlags, LookupScope};
use crate::provider::Instance;
use infrastructure_common::{DependencyError, DependencyResult, Token};
use std::any::Any;
use std::sync::Arc;

/// 解析结果
#[derive(Clone)]
pub enum Resolution {
    /// 单个实例
    Single(Instance),
    /// 多提供者集合，最近的作用域在前
    Multi(Vec<Instance>),
    /// 可选依赖缺失
    Absent,
}

impl Resolution {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_single(&self) -> Option<&Instance> {
        match self {
            Self::Single(instance) => Some(instance),
            _ => None,
        }
    }

    /// 展开为实例列表；单个实例视为一个元素，缺失视为空
    pub fn instances(&self) -> Vec<Instance> {
        match self {
            Self::Single(instance) => vec![instance.clone()],
            Self::Multi(instances) => instances.clone(),
            Self::Absent => Vec::new(),
        }
    }

    /// 转换为具体类型的单个实例
    pub fn downcast<T: Any + Send + Sync>(&self, token: &Token) -> DependencyResult<Arc<T>> {
        match self {
            Self::Single(instance) => downcast_instance(instance, token),
            Self::Multi(_) | Self::Absent => Err(DependencyError::type_mismatch::<T>(token)),
        }
    }

    /// 转换为可选实例
    pub fn downcast_optional<T: Any + Send + Sync>(
        &self,
        token: &Token,
    ) -> DependencyResult<Option<Arc<T>>> {
        match self {
            Self::Absent => Ok(None),
            other => other.downcast(token).map(Some),
        }
    }

    /// 转换为实例列表
    pub fn downcast_all<T: Any + Send + Sync>(&self, token: &Token) -> DependencyResult<Vec<Arc<T>>> {
        self.instances()
            .iter()
            .map(|instance| downcast_instance(instance, token))
            .collect()
    }

    /// 指针相等
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Single(a), Self::Single(b)) => Arc::ptr_eq(a, b),
            (Self::Multi(a), Self::Multi(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Arc::ptr_eq(x, y))
            }
            (Self::Absent, Self::Absent) => true,
            _ => false,
        }
    }
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(_) => f.write_str("Single(<instance>)"),
            Self::Multi(instances) => write!(f, "Multi(<{} instances>)", instances.len()),
            Self::Absent => f.write_str("Absent"),
        }
    }
}

fn downcast_instance<T: Any + Send + Sync>(
    instance: &Instance,
    token: &Token,
) -> DependencyResult<Arc<T>> {
    instance
        .clone()
        .downcast::<T>()
        .map_err(|_| DependencyError::type_mismatch::<T>(token))
}

/// 已解析的构造参数
///
/// 按描述符顺序保存每个参数的令牌和解析结果。
#[derive(Debug, Clone)]
pub struct ResolvedArgs {
    target: Token,
    params: Vec<(Token, Resolution)>,
}

impl ResolvedArgs {
    pub fn new(target: Token, params: Vec<(Token, Resolution)>) -> Self {
        Self { target, params }
    }

    /// 无参数
    pub fn empty(target: Token) -> Self {
        Self::new(target, Vec::new())
    }

    /// 正在构造的目标
    pub fn target(&self) -> &Token {
        &self.target
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// 原始解析结果
    pub fn resolution(&self, index: usize) -> DependencyResult<&Resolution> {
        self.params
            .get(index)
            .map(|(_, resolution)| resolution)
            .ok_or_else(|| DependencyError::MissingArgument {
                token: self.target.clone(),
                index,
            })
    }

    fn param(&self, index: usize) -> DependencyResult<&(Token, Resolution)> {
        self.params
            .get(index)
            .ok_or_else(|| DependencyError::MissingArgument {
                token: self.target.clone(),
                index,
            })
    }

    /// 第 `index` 个参数
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> DependencyResult<Arc<T>> {
        let (token, resolution) = self.param(index)?;
        resolution.downcast(token)
    }

    /// 第 `index` 个可选参数
    pub fn optional<T: Any + Send + Sync>(&self, index: usize) -> DependencyResult<Option<Arc<T>>> {
        let (token, resolution) = self.param(index)?;
        resolution.downcast_optional(token)
    }

    /// 第 `index` 个多提供者参数
    pub fn all<T: Any + Send + Sync>(&self, index: usize) -> DependencyResult<Vec<Arc<T>>> {
        let (token, resolution) = self.param(index)?;
        resolution.downcast_all(token)
    }
}

/// 解析选项
#[derive(Clone, Default)]
pub struct ResolveOptions {
    pub flags: InjectFlags,
    /// 找不到提供者时返回的缺省值
    pub default_value: Option<Instance>,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_flags(flags: InjectFlags) -> Self {
        Self {
            flags,
            default_value: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.flags.optional = true;
        self
    }

    pub fn self_only(mut self) -> Self {
        self.flags.self_only = true;
        self
    }

    pub fn skip_self(mut self) -> Self {
        self.flags.skip_self = true;
        self
    }

    pub fn host(mut self) -> Self {
        self.flags.host = true;
        self
    }

    /// 设置缺省值
    pub fn with_default<T: Send + Sync + 'static>(self, value: T) -> Self {
        self.with_default_instance(Arc::new(value))
    }

    pub fn with_default_instance(mut self, instance: Instance) -> Self {
        self.default_value = Some(instance);
        self
    }

    pub fn lookup(&self) -> LookupScope {
        self.flags.lookup()
    }
}

impl std::fmt::Debug for ResolveOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveOptions")
            .field("flags", &self.flags)
            .field("has_default", &self.default_value.is_some())
            .finish()
    }
}

/// 解析帧：某个注入器上解析某个令牌，以胜出提供者所在的作用域区分
///
/// 同一令牌经 `skip_self` 取到父级提供者不算重入；取到同一个提供者才算。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionFrame {
    pub scope_id: uuid::Uuid,
    pub token: Token,
    /// 提供者所在作用域；没有候选时为 `None`
    pub origin: Option<uuid::Uuid>,
}

/// 解析上下文
#[derive(Debug, Clone)]
pub struct ResolveContext {
    /// 当前解析链，用于检测循环依赖
    pub resolution_chain: Vec<ResolutionFrame>,
    detect_cycles: bool,
    max_depth: usize,
}

impl ResolveContext {
    /// 按注入器配置创建上下文
    pub fn new(config: &InjectorConfig) -> Self {
        Self {
            resolution_chain: Vec::new(),
            detect_cycles: config.enable_circular_dependency_detection,
            max_depth: config.max_resolution_depth,
        }
    }

    pub fn depth(&self) -> usize {
        self.resolution_chain.len()
    }

    /// 添加帧到解析链
    pub fn push_frame(&mut self, frame: ResolutionFrame) -> DependencyResult<()> {
        if self.detect_cycles && self.resolution_chain.contains(&frame) {
            let chain = self
                .resolution_chain
                .iter()
                .skip_while(|f| **f != frame)
                .map(|f| f.token.to_string())
                .chain(std::iter::once(frame.token.to_string()))
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(DependencyError::CircularDependency {
                dependency_chain: chain,
            });
        }
        if self.resolution_chain.len() >= self.max_depth {
            return Err(DependencyError::ResolutionDepthExceeded {
                token: frame.token,
                max_depth: self.max_depth,
            });
        }
        self.resolution_chain.push(frame);
        Ok(())
    }

    /// 从解析链中移除最后一帧
    pub fn pop_frame(&mut self) {
        self.resolution_chain.pop();
    }
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self::new(&InjectorConfig::default())
    }
}

/// 令牌解析器 trait
pub trait TokenResolver: Send + Sync {
    /// 在给定上下文中解析令牌
    fn resolve(
        &self,
        token: &Token,
        options: &ResolveOptions,
        context: &mut ResolveContext,
    ) -> DependencyResult<Resolution>;

    /// 以新的上下文解析令牌
    fn get_with(&self, token: &Token, options: &ResolveOptions) -> DependencyResult<Resolution>;

    /// 在允许的链上是否存在提供者
    fn can_resolve(&self, token: &Token) -> bool;

    /// 无修饰符解析
    fn get(&self, token: &Token) -> DependencyResult<Resolution> {
        self.get_with(token, &ResolveOptions::default())
    }

    /// 解析为具体类型
    fn get_as<T: Any + Send + Sync>(&self, token: &Token) -> DependencyResult<Arc<T>>
    where
        Self: Sized,
    {
        self.get(token)?.downcast(token)
    }

    /// 解析为实例列表（多提供者）
    fn get_all<T: Any + Send + Sync>(&self, token: &Token) -> DependencyResult<Vec<Arc<T>>>
    where
        Self: Sized,
    {
        self.get(token)?.downcast_all(token)
    }

    /// 可选解析，找不到时返回 `None`
    fn get_optional<T: Any + Send + Sync>(&self, token: &Token) -> DependencyResult<Option<Arc<T>>>
    where
        Self: Sized,
    {
        self.get_with(token, &ResolveOptions::new().optional())?
            .downcast_optional(token)
    }
}
