//! # 依赖注入具体实现
//!
//! 提供分层注入器、提供者注册表、描述符表以及令牌解析算法的实现。
//!
//! ## 核心类型
//!
//! - [`Injector`] - 作用域树上的注入器节点，持有注册表和单例缓存
//! - [`InjectorBuilder`] - 注入器构建器
//! - [`ProviderRegistry`] - 单个作用域的提供者注册表
//! - [`DescriptorTable`] - 集中登记的依赖描述符表
//!
//! ## 解析规则
//!
//! - 单值令牌取最近作用域的提供者，多提供者令牌按最近优先聚合整条链
//! - 实例缓存在发起解析的注入器上，同一注入器对同一令牌只构建一次
//! - 子依赖和别名从发起解析的注入器重新解析

pub mod descriptors;
pub mod injector;
pub mod registry;
mod resolution;
mod validation;

pub use descriptors::DescriptorTable;
pub use injector::{Injector, InjectorBuilder};
pub use registry::ProviderRegistry;
