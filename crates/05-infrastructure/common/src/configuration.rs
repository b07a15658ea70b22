//! 配置相关的基础接口定义
//!
//! 这里只负责把已经读入内存的配置文本解析成强类型配置，不做任何文件读取。

use crate::errors::{ConfigError, ConfigResult};
use serde::de::DeserializeOwned;

/// 配置文本格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// 解析为通用的 JSON 值
    pub fn parse_value(self, content: &str) -> ConfigResult<serde_json::Value> {
        match self {
            Self::Toml => Ok(toml::from_str::<serde_json::Value>(content)?),
            Self::Json => Ok(serde_json::from_str(content)?),
        }
    }
}

/// 可配置类型 trait
///
/// 配置既可以作为独立文档出现，也可以作为更大文档中的 `[SECTION]` 节出现。
pub trait Configurable: DeserializeOwned + Default {
    /// 配置节名称
    const SECTION: &'static str;

    /// 验证配置
    fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }

    /// 从配置文本解析并验证
    fn from_content(content: &str, format: ConfigFormat) -> ConfigResult<Self> {
        let mut value = format.parse_value(content)?;
        if let Some(section) = value.get_mut(Self::SECTION) {
            value = section.take();
        }

        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文本解析
    fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Self::from_content(content, ConfigFormat::Toml)
    }

    /// 从 JSON 文本解析
    fn from_json_str(content: &str) -> ConfigResult<Self> {
        Self::from_content(content, ConfigFormat::Json)
    }
}

/// 创建验证错误
pub fn validation_error(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        message: message.into(),
    }
}
