//! # Infrastructure Common
//!
//! 这个 crate 提供了依赖注入引擎各层共用的基础类型。
//!
//! ## 核心类型
//!
//! - [`Token`] - 注入令牌（名称、唯一符号、类型身份）
//! - [`Scope`] - 注入器作用域标识
//! - [`DependencyError`] - 依赖解析错误分类
//! - [`Configurable`] - 可从 TOML / JSON 文本解析的配置
//!
//! ## 设计原则
//!
//! - 令牌只按相等性比较，不同形式之间不做转换
//! - 所有错误同步返回，由调用方决定如何处理

pub mod configuration;
pub mod errors;
pub mod scope;
pub mod token;

pub use configuration::*;
pub use errors::*;
pub use scope::*;
pub use token::*;
