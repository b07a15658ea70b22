//! 错误类型定义

use crate::token::Token;
use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },

    #[error("配置序列化失败: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },
}

impl From<toml::de::Error> for ConfigError {
    fn from(error: toml::de::Error) -> Self {
        Self::ParseError {
            source: Box::new(error),
        }
    }
}

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("没有找到提供者: {token}")]
    NoProviderFound { token: Token },

    #[error("无效的提供者定义: {token}")]
    InvalidProviderSpec { token: Token },

    #[error("实例构建失败: {token}, 原因: {source}")]
    ConstructionFailure {
        token: Token,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("循环依赖检测到: {dependency_chain}")]
    CircularDependency { dependency_chain: String },

    #[error("超出最大解析深度 {max_depth}: {token}")]
    ResolutionDepthExceeded { token: Token, max_depth: usize },

    #[error("类型不匹配: {token}, 期望 {expected}")]
    TypeMismatch { token: Token, expected: &'static str },

    #[error("缺少第 {index} 个依赖参数: {token}")]
    MissingArgument { token: Token, index: usize },
}

impl DependencyError {
    /// 创建未找到提供者错误
    pub fn no_provider(token: &Token) -> Self {
        Self::NoProviderFound {
            token: token.clone(),
        }
    }

    /// 创建类型不匹配错误
    pub fn type_mismatch<T: ?Sized>(token: &Token) -> Self {
        Self::TypeMismatch {
            token: token.clone(),
            expected: std::any::type_name::<T>(),
        }
    }

    /// 错误涉及的令牌（循环依赖错误没有单一令牌）
    pub fn token(&self) -> Option<&Token> {
        match self {
            Self::NoProviderFound { token }
            | Self::InvalidProviderSpec { token }
            | Self::ConstructionFailure { token, .. }
            | Self::ResolutionDepthExceeded { token, .. }
            | Self::TypeMismatch { token, .. }
            | Self::MissingArgument { token, .. } => Some(token),
            Self::CircularDependency { .. } => None,
        }
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
