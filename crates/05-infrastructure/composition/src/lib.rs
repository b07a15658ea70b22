//! # 基础设施组合层
//!
//! 这个 crate 负责把根提供者、发现器和应用模块组合成一棵可运行的注入器树。
//!
//! ## 主要功能
//!
//! - **应用构建器**: 使用构建者模式收集根提供者和发现器
//! - **模块启动**: 创建模块注入器并立即实例化模块
//! - **日志初始化**: 按需安装 tracing 订阅器
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use di_abstractions::{provide_value, ClassRef, DependencyDescriptor};
//! use infrastructure_composition::{ApplicationBuilder, LoggingConfig, ModuleDef};
//! use std::sync::Arc;
//!
//! struct AppModule {
//!     port: Arc<u16>,
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let module = ModuleDef::new(
//!         ClassRef::new(|args| Ok(AppModule { port: args.get::<u16>(0)? }))
//!             .with_descriptor(DependencyDescriptor::new(["PORT"])),
//!     );
//!
//!     let app = ApplicationBuilder::new()
//!         .with_logging(LoggingConfig::development())
//!         .provide_root(provide_value("PORT", 8080_u16))
//!         .bootstrap(module)?;
//!
//!     if let Some(module) = app.module_as::<AppModule>() {
//!         println!("监听端口: {}", module.port);
//!     }
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod builder;

// 重新导出主要类型
pub use application::{ApplicationContext, ModuleDef};
pub use builder::{ApplicationBuilder, LoggingConfig};

// 重新导出错误类型
pub use infrastructure_common::InfrastructureError;
