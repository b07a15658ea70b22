//! 提供者发现抽象接口
//!
//! 目录扫描、约定发现等过程在引擎之外进行，它们只需要产出一组 [`ProviderSpec`]。

use crate::provider::ProviderSpec;
use infrastructure_common::InfrastructureError;

/// 提供者发现器 trait
pub trait ProviderDiscovery: Send + Sync {
    /// 获取发现器名称
    fn name(&self) -> &str;

    /// 发现提供者
    fn discover(&self) -> Result<Vec<ProviderSpec>, InfrastructureError>;
}

/// 固定列表发现器
#[derive(Debug, Clone)]
pub struct StaticDiscovery {
    name: String,
    providers: Vec<ProviderSpec>,
}

impl StaticDiscovery {
    pub fn new(name: impl Into<String>, providers: Vec<ProviderSpec>) -> Self {
        Self {
            name: name.into(),
            providers,
        }
    }
}

impl ProviderDiscovery for StaticDiscovery {
    fn name(&self) -> &str {
        &self.name
    }

    fn discover(&self) -> Result<Vec<ProviderSpec>, InfrastructureError> {
        Ok(self.providers.clone())
    }
}
