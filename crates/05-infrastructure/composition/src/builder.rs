//! 应用构建器

use crate::application::{ApplicationContext, ModuleDef};
use di_abstractions::{
    DescriptorSource, InjectorConfig, ProviderDiscovery, ProviderSpec, TokenResolver,
};
use di_impl::Injector;
use infrastructure_common::{Configurable, InfrastructureError};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// 应用构建器
///
/// 收集根提供者，构建根注入器和模块注入器，并立即实例化模块
pub struct ApplicationBuilder {
    /// 显式注册的根提供者
    root_providers: Vec<ProviderSpec>,
    /// 提供者发现器列表
    discoveries: Vec<Box<dyn ProviderDiscovery>>,
    /// 描述符来源
    descriptors: Option<Arc<dyn DescriptorSource>>,
    /// 注入器配置
    injector_config: InjectorConfig,
    /// 启动前是否校验模块注入器
    validation_enabled: bool,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
}

impl ApplicationBuilder {
    /// 创建新的应用构建器
    pub fn new() -> Self {
        Self {
            root_providers: Vec::new(),
            discoveries: Vec::new(),
            descriptors: None,
            injector_config: InjectorConfig::default(),
            validation_enabled: false,
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: LoggingConfig::default(),
        }
    }

    /// 注册一个根提供者
    pub fn provide_root(mut self, spec: ProviderSpec) -> Self {
        debug!("注册根提供者: {}", spec.token);
        self.root_providers.push(spec);
        self
    }

    /// 注册一组根提供者
    pub fn with_providers<I>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = ProviderSpec>,
    {
        self.root_providers.extend(specs);
        self
    }

    /// 添加提供者发现器，发现的提供者注册在显式提供者之后
    pub fn add_discovery<T: ProviderDiscovery + 'static>(mut self, discovery: T) -> Self {
        info!("添加提供者发现器: {}", discovery.name());
        self.discoveries.push(Box::new(discovery));
        self
    }

    /// 指定描述符来源
    pub fn with_descriptors(mut self, descriptors: Arc<dyn DescriptorSource>) -> Self {
        self.descriptors = Some(descriptors);
        self
    }

    /// 指定注入器配置
    pub fn with_injector_config(mut self, config: InjectorConfig) -> Self {
        self.injector_config = config;
        self
    }

    /// 从 TOML 文件读取注入器配置
    pub fn add_config_toml<P: AsRef<Path>>(mut self, path: P) -> Result<Self, InfrastructureError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InfrastructureError::BootstrapFailed {
                message: format!("配置文件不存在: {}", path.display()),
            });
        }

        info!("读取 TOML 配置文件: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            InfrastructureError::BootstrapFailed {
                message: format!("读取配置文件失败: {}: {}", path.display(), e),
            }
        })?;
        self.injector_config = InjectorConfig::from_toml_str(&content)?;
        Ok(self)
    }

    /// 启用或禁用启动前校验
    pub fn enable_validation(mut self, enabled: bool) -> Self {
        self.validation_enabled = enabled;
        self
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true;
        self
    }

    /// 构建根注入器，不创建模块
    pub fn build_root(self) -> Result<Arc<Injector>, InfrastructureError> {
        // 只有在明确配置了日志时才初始化日志
        if self.logging_enabled {
            self.logging_config.install()?;
        }

        let mut providers = self.root_providers;
        for discovery in &self.discoveries {
            let discovered = discovery.discover()?;
            info!("发现器 {} 提供了 {} 个根提供者", discovery.name(), discovered.len());
            providers.extend(discovered);
        }

        let mut builder = Injector::builder()
            .name("root")
            .providers(providers)
            .config(self.injector_config);
        if let Some(descriptors) = self.descriptors {
            builder = builder.descriptors(descriptors);
        }
        Ok(builder.build())
    }

    /// 启动应用：构建根注入器和模块注入器，并实例化模块
    pub fn bootstrap(self, module: ModuleDef) -> Result<ApplicationContext, InfrastructureError> {
        info!("开始启动应用模块: {}", module.name());

        let validation_enabled = self.validation_enabled;
        let root = self.build_root()?;
        let (name, token, providers) = module.into_providers();
        let module_injector = root.create_named_child(name, providers);

        if validation_enabled {
            if let Err(errors) = module_injector.validate() {
                for error in &errors {
                    warn!("校验问题: {}", error);
                }
                let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
                return Err(InfrastructureError::BootstrapFailed {
                    message: format!("模块校验失败: {}", messages.join(", ")),
                });
            }
        }

        let instance = module_injector
            .get(&token)?
            .as_single()
            .cloned()
            .ok_or_else(|| InfrastructureError::BootstrapFailed {
                message: format!("模块 {} 没有解析为单个实例", token),
            })?;

        info!("应用启动完成: {}", module_injector.scope().name);
        Ok(ApplicationContext::new(root, module_injector, instance))
    }
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志配置
///
/// `RUST_LOG` 存在时优先使用，否则由 [`LoggingConfig::directive`] 生成过滤规则。
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 全局日志级别
    pub level: tracing::Level,
    /// 解析引擎（`di_impl`、`di_abstractions`）单独的级别，`None` 时跟随全局级别
    pub resolution_level: Option<tracing::Level>,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示源码位置
    pub show_source_location: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            resolution_level: None,
            show_target: true,
            show_source_location: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 开发环境：输出每一步解析
    pub fn development() -> Self {
        Self {
            level: tracing::Level::INFO,
            resolution_level: Some(tracing::Level::DEBUG),
            show_target: true,
            show_source_location: true,
            json_format: false,
        }
    }

    /// 生产环境：只保留告警以上的解析日志
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            resolution_level: Some(tracing::Level::WARN),
            show_target: false,
            show_source_location: false,
            json_format: true,
        }
    }

    /// `EnvFilter` 过滤规则，例如 `info,di_impl=debug,di_abstractions=debug`
    pub fn directive(&self) -> String {
        let global = self.level.as_str().to_lowercase();
        match self.resolution_level {
            Some(level) => {
                let level = level.as_str().to_lowercase();
                format!("{},di_impl={},di_abstractions={}", global, level, level)
            }
            None => global,
        }
    }

    /// 安装全局订阅者；已经安装过时返回错误
    pub fn install(&self) -> Result<(), InfrastructureError> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(self.directive()))
            .map_err(|e| InfrastructureError::BootstrapFailed {
                message: format!("日志过滤规则无效: {}", e),
            })?;

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(self.show_target)
            .with_file(self.show_source_location)
            .with_line_number(self.show_source_location);

        if self.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        }
        .map_err(|e| InfrastructureError::BootstrapFailed {
            message: format!("日志初始化失败: {}", e),
        })?;

        info!("日志系统初始化完成: {}", self.directive());
        Ok(())
    }
}
