//! 注入令牌定义
//!
//! 令牌是依赖的不透明标识，三种形式（名称、唯一符号、类型）统一在 [`Token`] 中。
//! 不同形式之间不做任何转换：`Token::name("Foo")` 与 `Token::of::<Foo>()` 是两个依赖。

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// 类型信息
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    /// 类型ID
    pub id: TypeId,
    /// 完整类型名称（包含模块路径）
    pub name: &'static str,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// 唯一符号
///
/// 每次 [`Symbol::new`] 都产生一个新的身份，描述只用于诊断输出。
#[derive(Debug, Clone)]
pub struct Symbol {
    id: uuid::Uuid,
    description: Arc<str>,
}

impl Symbol {
    /// 创建新的唯一符号
    pub fn new(description: impl Into<Arc<str>>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            description: description.into(),
        }
    }

    /// 符号ID
    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    /// 符号描述
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// 注入令牌
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// 字符串名称
    Name(Arc<str>),
    /// 唯一符号
    Symbol(Symbol),
    /// 类型身份
    Type(TypeInfo),
}

impl Token {
    /// 名称令牌
    pub fn name(name: impl Into<Arc<str>>) -> Self {
        Self::Name(name.into())
    }

    /// 新的唯一符号令牌
    pub fn symbol(description: impl Into<Arc<str>>) -> Self {
        Self::Symbol(Symbol::new(description))
    }

    /// 类型令牌
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Type(TypeInfo::of::<T>())
    }

    /// 是否为类型令牌
    pub fn is_type(&self) -> bool {
        matches!(self, Self::Type(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Symbol(symbol) => write!(f, "Symbol({})", symbol.description),
            Self::Type(info) => f.write_str(info.short_name()),
        }
    }
}

impl From<&str> for Token {
    fn from(name: &str) -> Self {
        Self::name(name)
    }
}

impl From<String> for Token {
    fn from(name: String) -> Self {
        Self::name(name)
    }
}

impl From<Symbol> for Token {
    fn from(symbol: Symbol) -> Self {
        Self::Symbol(symbol)
    }
}

impl From<TypeInfo> for Token {
    fn from(info: TypeInfo) -> Self {
        Self::Type(info)
    }
}
