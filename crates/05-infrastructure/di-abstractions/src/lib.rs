//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义提供者模型和令牌解析的核心接口。
//!
//! ## 核心接口
//!
//! - [`ProviderSpec`] - 提供者定义（值、类、工厂、别名）
//! - [`DependencyDescriptor`] - 构造参数描述符
//! - [`TokenResolver`] - 令牌解析器接口
//! - [`ResolveContext`] - 解析上下文，检测循环依赖
//! - [`ProviderDiscovery`] - 外部提供者发现接口

pub mod config;
pub mod descriptor;
pub mod discovery;
pub mod graph;
pub mod provider;
pub mod resolver;

pub use config::*;
pub use descriptor::*;
pub use discovery::*;
pub use graph::*;
pub use provider::*;
pub use resolver::*;
