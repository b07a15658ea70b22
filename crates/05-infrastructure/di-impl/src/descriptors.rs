//! 描述符表实现

use di_abstractions::{DependencyDescriptor, DescriptorSource};
use infrastructure_common::Token;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// 集中登记的描述符表
///
/// 按可构造类型或工厂函数的身份令牌保存描述符，注入器树共享同一张表。
#[derive(Debug, Default)]
pub struct DescriptorTable {
    descriptors: RwLock<HashMap<Token, DependencyDescriptor>>,
}

impl DescriptorTable {
    /// 创建空表
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记描述符，同一身份后登记的覆盖先登记的
    pub fn register(&self, target: impl Into<Token>, descriptor: DependencyDescriptor) {
        let target = target.into();
        debug!("登记依赖描述符: {} ({} 个参数)", target, descriptor.len());
        self.descriptors.write().insert(target, descriptor);
    }

    /// 按类型登记描述符
    pub fn register_type<T: ?Sized + 'static>(&self, descriptor: DependencyDescriptor) {
        self.register(Token::of::<T>(), descriptor);
    }

    /// 构建式登记
    pub fn with(self, target: impl Into<Token>, descriptor: DependencyDescriptor) -> Self {
        self.register(target, descriptor);
        self
    }

    pub fn len(&self) -> usize {
        self.descriptors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.read().is_empty()
    }
}

impl DescriptorSource for DescriptorTable {
    fn descriptor(&self, target: &Token) -> Option<DependencyDescriptor> {
        self.descriptors.read().get(target).cloned()
    }
}
