//! 应用上下文与模块定义

use di_abstractions::{
    provide_class, ClassRef, Injectable, Instance, ProviderSpec, TokenResolver,
};
use di_impl::Injector;
use infrastructure_common::{DependencyResult, Token};
use std::any::Any;
use std::sync::Arc;

/// 模块定义
///
/// 模块自身作为类提供者注册到模块注入器中，`providers` 是模块私有的提供者。
#[derive(Debug, Clone)]
pub struct ModuleDef {
    name: String,
    class: ClassRef,
    providers: Vec<ProviderSpec>,
}

impl ModuleDef {
    /// 以类型引用创建模块
    pub fn new(class: ClassRef) -> Self {
        Self {
            name: class.type_info().short_name().to_string(),
            class,
            providers: Vec::new(),
        }
    }

    /// 由 [`Injectable`] 类型创建模块
    pub fn injectable<T: Injectable>() -> Self {
        Self::new(ClassRef::injectable::<T>())
    }

    /// 模块作用域名称，默认为类型名
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 追加模块私有提供者
    pub fn provider(mut self, spec: ProviderSpec) -> Self {
        self.providers.push(spec);
        self
    }

    /// 追加一组模块私有提供者
    pub fn with_providers<I>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = ProviderSpec>,
    {
        self.providers.extend(specs);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 模块类型的令牌
    pub fn token(&self) -> Token {
        self.class.token()
    }

    /// 模块注入器的完整提供者列表，模块类本身在最前
    pub(crate) fn into_providers(self) -> (String, Token, Vec<ProviderSpec>) {
        let token = self.token();
        let mut providers = Vec::with_capacity(self.providers.len() + 1);
        providers.push(provide_class(token.clone(), self.class));
        providers.extend(self.providers);
        (self.name, token, providers)
    }
}

/// 启动完成的应用
///
/// 持有根注入器的强引用，模块注入器和之后创建的子注入器依赖它保持父链完整。
#[derive(Debug)]
pub struct ApplicationContext {
    root: Arc<Injector>,
    module: Arc<Injector>,
    module_instance: Instance,
}

impl ApplicationContext {
    pub(crate) fn new(root: Arc<Injector>, module: Arc<Injector>, module_instance: Instance) -> Self {
        Self {
            root,
            module,
            module_instance,
        }
    }

    /// 根注入器
    pub fn root(&self) -> &Arc<Injector> {
        &self.root
    }

    /// 模块注入器
    pub fn module_injector(&self) -> &Arc<Injector> {
        &self.module
    }

    /// 启动时实例化的模块实例
    pub fn module_instance(&self) -> &Instance {
        &self.module_instance
    }

    /// 按具体类型取模块实例
    pub fn module_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.module_instance).downcast::<T>().ok()
    }

    /// 在根注入器下创建新的模块注入器
    pub fn create_module_injector<I>(&self, providers: I) -> Arc<Injector>
    where
        I: IntoIterator<Item = ProviderSpec>,
    {
        self.root.create_child(providers)
    }

    /// 从模块注入器解析
    pub fn get_as<T: Any + Send + Sync>(&self, token: &Token) -> DependencyResult<Arc<T>> {
        self.module.get_as::<T>(token)
    }
}
