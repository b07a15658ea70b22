//! 依赖描述符
//!
//! 描述一个可构造类型或工厂函数的参数列表：每个位置一个令牌和一组修饰符。
//! 描述符由外部提供（手工注册、代码生成等），解析引擎只消费它。

use infrastructure_common::Token;

/// 注入修饰符
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InjectFlags {
    /// 找不到提供者时返回缺省值而不是报错
    pub optional: bool,
    /// 只在当前注入器中查找
    pub self_only: bool,
    /// 跳过当前注入器，从父注入器开始查找
    pub skip_self: bool,
    /// 接受但目前不影响查找范围
    pub host: bool,
}

impl InjectFlags {
    /// 查找范围；`self_only` 优先于 `skip_self`
    pub fn lookup(&self) -> LookupScope {
        if self.self_only {
            LookupScope::SelfOnly
        } else if self.skip_self {
            LookupScope::SkipSelf
        } else {
            LookupScope::Chain
        }
    }
}

/// 注入器链的查找范围
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LookupScope {
    /// 从当前注入器一直查找到根
    #[default]
    Chain,
    /// 只查找当前注入器
    SelfOnly,
    /// 只查找父注入器（没有父注入器时退回当前注入器）
    SkipSelf,
}

/// 单个依赖参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub token: Token,
    pub flags: InjectFlags,
}

impl Dependency {
    /// 必需依赖，无修饰符
    pub fn new(token: impl Into<Token>) -> Self {
        Self {
            token: token.into(),
            flags: InjectFlags::default(),
        }
    }

    /// 标记为可选
    pub fn optional(mut self) -> Self {
        self.flags.optional = true;
        self
    }

    /// 只在当前注入器查找
    pub fn self_only(mut self) -> Self {
        self.flags.self_only = true;
        self
    }

    /// 跳过当前注入器
    pub fn skip_self(mut self) -> Self {
        self.flags.skip_self = true;
        self
    }

    /// 宿主修饰符
    pub fn host(mut self) -> Self {
        self.flags.host = true;
        self
    }
}

impl From<Token> for Dependency {
    fn from(token: Token) -> Self {
        Self::new(token)
    }
}

impl From<&str> for Dependency {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// 依赖描述符
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyDescriptor {
    params: Vec<Dependency>,
}

impl DependencyDescriptor {
    /// 零依赖描述符
    pub fn empty() -> Self {
        Self::default()
    }

    /// 按参数顺序创建描述符
    pub fn new<I, D>(params: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Dependency>,
    {
        Self {
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// 追加一个参数
    pub fn with(mut self, dependency: impl Into<Dependency>) -> Self {
        self.params.push(dependency.into());
        self
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dependency> {
        self.params.iter()
    }
}

impl<'a> IntoIterator for &'a DependencyDescriptor {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

/// 描述符来源
///
/// 按可构造类型或工厂函数的身份令牌提供描述符。返回 `None` 表示零依赖。
pub trait DescriptorSource: Send + Sync {
    fn descriptor(&self, target: &Token) -> Option<DependencyDescriptor>;
}
