//! 注入器树的静态校验
//!
//! 不构造任何实例，只检查当前注入器可见的提供者：配方是否完整、必需依赖是否可解析、
//! 依赖之间是否成环。

use crate::injector::Injector;
use di_abstractions::{
    CircularDependencyDetector, DefaultCircularDependencyDetector, DependencyGraphNode,
    LookupScope,
};
use infrastructure_common::{DependencyError, Token};
use std::collections::HashSet;
use tracing::{info, warn};

impl Injector {
    /// 校验从本注入器可见的全部提供者，返回发现的所有问题
    pub fn validate(&self) -> Result<(), Vec<DependencyError>> {
        let mut errors = Vec::new();
        let mut graph = Vec::new();

        for token in self.visible_tokens() {
            let mut dependencies = Vec::new();
            let mut specs = self.collect_providers(&token, LookupScope::Chain);
            // 非多提供者只有最近的一个会被构建
            if !specs.iter().any(|spec| spec.multi) {
                specs.truncate(1);
            }
            for spec in specs {
                let Some(kind) = &spec.kind else {
                    errors.push(DependencyError::InvalidProviderSpec {
                        token: spec.token.clone(),
                    });
                    continue;
                };

                for dependency in &self.descriptor_for(kind) {
                    if dependency.flags.optional {
                        continue;
                    }
                    let lookup = dependency.flags.lookup();
                    if self.collect_providers(&dependency.token, lookup).is_empty() {
                        errors.push(DependencyError::no_provider(&dependency.token));
                    }
                    if self.resolves_on_chain(lookup) {
                        dependencies.push(dependency.token.clone());
                    }
                }
            }

            graph.push(DependencyGraphNode { token, dependencies });
        }

        errors.extend(DefaultCircularDependencyDetector.detect_circular_dependencies(&graph));

        if errors.is_empty() {
            info!("注入器校验通过: {} ({} 个令牌)", self.scope.name, graph.len());
            Ok(())
        } else {
            warn!("注入器校验失败: {} ({} 个问题)", self.scope.name, errors.len());
            Err(errors)
        }
    }

    /// 依赖是否落在本链的同名提供者上；取到父级提供者的 `skip_self` 不构成本链上的环
    fn resolves_on_chain(&self, lookup: LookupScope) -> bool {
        match lookup {
            LookupScope::Chain | LookupScope::SelfOnly => true,
            LookupScope::SkipSelf => self.parent.is_none(),
        }
    }

    /// 本级及祖先注册的令牌，去重后近处在前
    fn visible_tokens(&self) -> Vec<Token> {
        let mut seen = HashSet::new();
        let mut tokens: Vec<Token> = self
            .registered_tokens()
            .into_iter()
            .filter(|token| seen.insert(token.clone()))
            .collect();

        let mut ancestor = self.parent();
        while let Some(injector) = ancestor {
            tokens.extend(
                injector
                    .registered_tokens()
                    .into_iter()
                    .filter(|token| seen.insert(token.clone())),
            );
            ancestor = injector.parent();
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_abstractions::{
        provide_existing, provide_factory, provide_value, Dependency, DependencyDescriptor,
        FactoryFn, ProviderSpec,
    };

    fn factory(token: &str, deps: DependencyDescriptor) -> ProviderSpec {
        provide_factory(token, FactoryFn::new(|_| Ok(())), Some(deps))
    }

    #[test]
    fn test_complete_tree_is_valid() {
        let root = Injector::new([provide_value("A", 1_u32)]);
        let child = root.create_child([factory("B", DependencyDescriptor::new(["A"]))]);
        assert!(child.validate().is_ok());
    }

    #[test]
    fn test_missing_required_dependency_is_reported() {
        let injector = Injector::new([
            factory("B", DependencyDescriptor::new(["A"])),
            factory("C", DependencyDescriptor::new([Dependency::new("D").optional()])),
        ]);

        let errors = injector.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].token().map(ToString::to_string).as_deref(), Some("A"));
    }

    #[test]
    fn test_cycle_and_invalid_spec_are_both_reported() {
        let injector = Injector::new([
            provide_existing("A", "B"),
            factory("B", DependencyDescriptor::new(["A"])),
            ProviderSpec::new("EMPTY"),
        ]);

        let errors = injector.validate().unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, DependencyError::CircularDependency { .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, DependencyError::InvalidProviderSpec { .. })));
    }

    #[test]
    fn test_skip_self_dependency_is_not_a_cycle() {
        let root = Injector::new([provide_value("LOGGER", "root")]);
        let child = root.create_child([factory(
            "LOGGER",
            DependencyDescriptor::new([Dependency::new("LOGGER").skip_self()]),
        )]);
        assert!(child.validate().is_ok());
    }

    #[test]
    fn test_self_only_dependency_on_itself_is_reported() {
        let injector = Injector::new([factory(
            "A",
            DependencyDescriptor::new([Dependency::new("A").self_only()]),
        )]);

        let errors = injector.validate().unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [DependencyError::CircularDependency { .. }]
        ));
    }

    #[test]
    fn test_skip_self_on_root_resolves_locally_and_can_cycle() {
        let injector = Injector::new([factory(
            "A",
            DependencyDescriptor::new([Dependency::new("A").skip_self()]),
        )]);
        assert!(injector.validate().is_err());
    }
}
