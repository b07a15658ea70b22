//! 提供者定义
//!
//! [`ProviderSpec`] 是满足一个令牌的声明式配方：直接给值、构造类型、调用工厂或者
//! 指向另一个令牌。`provide_*` 函数是没有副作用的纯构建函数。

use crate::descriptor::DependencyDescriptor;
use crate::resolver::ResolvedArgs;
use infrastructure_common::{Token, TypeInfo};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 解析得到的实例
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 构造函数类型
pub type ConstructFn = Arc<dyn Fn(&ResolvedArgs) -> anyhow::Result<Instance> + Send + Sync>;

fn erase<T, F>(construct: F) -> ConstructFn
where
    T: Send + Sync + 'static,
    F: Fn(&ResolvedArgs) -> anyhow::Result<T> + Send + Sync + 'static,
{
    Arc::new(move |args| Ok(Arc::new(construct(args)?) as Instance))
}

/// 可注入类型 trait
///
/// 实现者同时给出自己的依赖描述符和构造方式，[`ClassRef::injectable`] 据此生成类提供者。
pub trait Injectable: Sized + Send + Sync + 'static {
    /// 构造参数描述符
    fn descriptor() -> DependencyDescriptor {
        DependencyDescriptor::empty()
    }

    /// 使用已解析的参数构造实例
    fn construct(args: &ResolvedArgs) -> anyhow::Result<Self>;
}

/// 可构造类型的引用
#[derive(Clone)]
pub struct ClassRef {
    type_info: TypeInfo,
    construct: ConstructFn,
    descriptor: Option<DependencyDescriptor>,
}

impl ClassRef {
    /// 用构造函数创建类型引用，描述符由 [`DescriptorSource`](crate::DescriptorSource) 提供
    pub fn new<T, F>(construct: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolvedArgs) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self {
            type_info: TypeInfo::of::<T>(),
            construct: erase(construct),
            descriptor: None,
        }
    }

    /// 由 [`Injectable`] 实现创建，自带描述符
    pub fn injectable<T: Injectable>() -> Self {
        Self::new(T::construct).with_descriptor(T::descriptor())
    }

    /// 指定内联描述符
    pub fn with_descriptor(mut self, descriptor: DependencyDescriptor) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    /// 类型身份令牌
    pub fn token(&self) -> Token {
        Token::Type(self.type_info)
    }

    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    /// 内联描述符
    pub fn descriptor(&self) -> Option<&DependencyDescriptor> {
        self.descriptor.as_ref()
    }

    /// 调用构造函数
    pub fn construct(&self, args: &ResolvedArgs) -> anyhow::Result<Instance> {
        (self.construct)(args)
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRef")
            .field("type", &self.type_info.name)
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

/// 工厂函数
#[derive(Clone)]
pub struct FactoryFn {
    identity: Token,
    invoke: ConstructFn,
    descriptor: Option<DependencyDescriptor>,
}

impl FactoryFn {
    /// 以闭包自身的类型作为身份
    pub fn new<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolvedArgs) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self {
            identity: Token::of::<F>(),
            invoke: erase(factory),
            descriptor: None,
        }
    }

    /// 以名称作为身份，便于在描述符表中登记
    pub fn named<T, F>(name: impl Into<Token>, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolvedArgs) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self {
            identity: name.into(),
            ..Self::new(factory)
        }
    }

    /// 指定函数自身的描述符
    pub fn with_descriptor(mut self, descriptor: DependencyDescriptor) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    /// 身份令牌，用于查找描述符
    pub fn identity(&self) -> &Token {
        &self.identity
    }

    pub fn descriptor(&self) -> Option<&DependencyDescriptor> {
        self.descriptor.as_ref()
    }

    /// 调用工厂
    pub fn invoke(&self, args: &ResolvedArgs) -> anyhow::Result<Instance> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for FactoryFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryFn")
            .field("identity", &self.identity)
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

/// 提供者形式
#[derive(Clone)]
pub enum ProviderKind {
    /// 原样返回的值
    Value(Instance),
    /// 构造类型
    Class(ClassRef),
    /// 调用工厂；`deps` 为空时使用工厂自身的描述符
    Factory {
        factory: FactoryFn,
        deps: Option<DependencyDescriptor>,
    },
    /// 解析另一个令牌
    Existing(Token),
}

impl fmt::Debug for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(_) => f.write_str("Value(<instance>)"),
            Self::Class(class) => f.debug_tuple("Class").field(class).finish(),
            Self::Factory { factory, deps } => f
                .debug_struct("Factory")
                .field("factory", factory)
                .field("deps", deps)
                .finish(),
            Self::Existing(alias) => f.debug_tuple("Existing").field(alias).finish(),
        }
    }
}

/// 提供者定义
///
/// `kind` 为 `None` 的定义是畸形的，在解析时报告 `InvalidProviderSpec`。
#[derive(Debug, Clone)]
pub struct ProviderSpec {
    pub token: Token,
    pub kind: Option<ProviderKind>,
    pub multi: bool,
}

impl ProviderSpec {
    /// 创建尚未指定形式的定义
    pub fn new(token: impl Into<Token>) -> Self {
        Self {
            token: token.into(),
            kind: None,
            multi: false,
        }
    }

    pub fn use_value<T: Send + Sync + 'static>(self, value: T) -> Self {
        self.use_instance(Arc::new(value))
    }

    /// 使用已经包装好的实例
    pub fn use_instance(mut self, instance: Instance) -> Self {
        self.kind = Some(ProviderKind::Value(instance));
        self
    }

    pub fn use_class(mut self, class: ClassRef) -> Self {
        self.kind = Some(ProviderKind::Class(class));
        self
    }

    pub fn use_factory(mut self, factory: FactoryFn, deps: Option<DependencyDescriptor>) -> Self {
        self.kind = Some(ProviderKind::Factory { factory, deps });
        self
    }

    pub fn use_existing(mut self, alias: impl Into<Token>) -> Self {
        self.kind = Some(ProviderKind::Existing(alias.into()));
        self
    }

    /// 标记为多提供者
    pub fn multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    /// 形式名称，用于日志
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            Some(ProviderKind::Value(_)) => "value",
            Some(ProviderKind::Class(_)) => "class",
            Some(ProviderKind::Factory { .. }) => "factory",
            Some(ProviderKind::Existing(_)) => "existing",
            None => "invalid",
        }
    }
}

/// 值提供者
pub fn provide_value<T: Send + Sync + 'static>(token: impl Into<Token>, value: T) -> ProviderSpec {
    ProviderSpec::new(token).use_value(value)
}

/// 类提供者
pub fn provide_class(token: impl Into<Token>, class: ClassRef) -> ProviderSpec {
    ProviderSpec::new(token).use_class(class)
}

/// 工厂提供者
pub fn provide_factory(
    token: impl Into<Token>,
    factory: FactoryFn,
    deps: Option<DependencyDescriptor>,
) -> ProviderSpec {
    ProviderSpec::new(token).use_factory(factory, deps)
}

/// 别名提供者
pub fn provide_existing(token: impl Into<Token>, alias: impl Into<Token>) -> ProviderSpec {
    ProviderSpec::new(token).use_existing(alias)
}

/// 多提供者：为每个定义打上同一个令牌和 `multi` 标记
pub fn provide_multi<I>(token: impl Into<Token>, specs: I) -> Vec<ProviderSpec>
where
    I: IntoIterator<Item = ProviderSpec>,
{
    let token = token.into();
    specs
        .into_iter()
        .map(|spec| ProviderSpec {
            token: token.clone(),
            multi: true,
            ..spec
        })
        .collect()
}
