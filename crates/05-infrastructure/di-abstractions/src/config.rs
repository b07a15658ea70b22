//! 注入器配置与统计

use infrastructure_common::{validation_error, ConfigResult, Configurable};
use serde::Deserialize;

/// 注入器配置
///
/// 子注入器继承父注入器的配置。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InjectorConfig {
    /// 是否启用循环依赖检测
    pub enable_circular_dependency_detection: bool,
    /// 最大解析深度
    pub max_resolution_depth: usize,
    /// 是否记录解析统计
    pub enable_statistics: bool,
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            enable_circular_dependency_detection: true,
            max_resolution_depth: 100,
            enable_statistics: true,
        }
    }
}

impl Configurable for InjectorConfig {
    const SECTION: &'static str = "injector";

    fn validate(&self) -> ConfigResult<()> {
        if self.max_resolution_depth == 0 {
            return Err(validation_error("max_resolution_depth 必须大于 0"));
        }
        Ok(())
    }
}

/// 注入器统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectorStats {
    /// 本级已注册提供者数量
    pub registered_providers: usize,
    /// 本级缓存条目数量
    pub cached_entries: usize,
    /// 在本级发起的解析次数
    pub resolutions: usize,
    /// 缓存命中次数
    pub cache_hits: usize,
    /// 解析错误数量
    pub resolution_errors: usize,
}
