//! 依赖图与静态循环依赖检测

use infrastructure_common::{DependencyError, Token};
use std::collections::{HashMap, HashSet};

/// 依赖图节点
#[derive(Debug, Clone)]
pub struct DependencyGraphNode {
    /// 提供者令牌
    pub token: Token,
    /// 必需依赖的令牌列表（可选依赖不会导致构造失败，不计入）
    pub dependencies: Vec<Token>,
}

/// 循环依赖检测器
pub trait CircularDependencyDetector: Send + Sync {
    /// 检测循环依赖，每个环报告一次
    fn detect_circular_dependencies(&self, graph: &[DependencyGraphNode]) -> Vec<DependencyError>;
}

/// 默认循环依赖检测器
#[derive(Debug, Default)]
pub struct DefaultCircularDependencyDetector;

impl CircularDependencyDetector for DefaultCircularDependencyDetector {
    fn detect_circular_dependencies(&self, graph: &[DependencyGraphNode]) -> Vec<DependencyError> {
        // 使用深度优先搜索检测循环依赖
        let edges: HashMap<&Token, &[Token]> = graph
            .iter()
            .map(|node| (&node.token, node.dependencies.as_slice()))
            .collect();
        let mut visited = HashSet::new();
        let mut path = Vec::new();
        let mut errors = Vec::new();

        for node in graph {
            if !visited.contains(&node.token) {
                Self::dfs_check(&node.token, &edges, &mut visited, &mut path, &mut errors);
            }
        }

        errors
    }
}

impl DefaultCircularDependencyDetector {
    fn dfs_check<'a>(
        current: &'a Token,
        edges: &HashMap<&'a Token, &'a [Token]>,
        visited: &mut HashSet<&'a Token>,
        path: &mut Vec<&'a Token>,
        errors: &mut Vec<DependencyError>,
    ) {
        if let Some(start) = path.iter().position(|token| *token == current) {
            // 检测到循环依赖
            let chain = path[start..]
                .iter()
                .chain(std::iter::once(&current))
                .map(|token| token.to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            errors.push(DependencyError::CircularDependency {
                dependency_chain: chain,
            });
            return;
        }

        if visited.contains(current) {
            return;
        }

        path.push(current);
        if let Some(&dependencies) = edges.get(current) {
            for dependency in dependencies {
                Self::dfs_check(dependency, edges, visited, path, errors);
            }
        }
        path.pop();
        visited.insert(current);
    }
}
