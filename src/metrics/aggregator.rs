use super::data::MetricsData;
use super::table::Metrics;
use crate::core::{LineHits, Node, NodeId, NodeKind, StructuralTree};
use std::path::Path;
use tracing::{debug, debug_span};

/// Builds a [`Metrics`] table from structural trees and filtered coverage.
///
/// Only non-closure functions and methods produce entries. Namespaces and
/// classes extend the qualified-name path; closures and other grouping nodes
/// are walked through without naming effect. A function's entry covers its
/// whole line span, so closures defined inside it count towards it.
#[derive(Debug, Default)]
pub struct MetricsAggregator {
    metrics: Metrics,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk one file. `coverage` must already be filtered to coverable lines.
    pub fn add_file(&mut self, file: &Path, tree: &StructuralTree, coverage: &LineHits) {
        let _span = debug_span!("aggregate_file", file = %file.display()).entered();
        self.walk(file, tree, tree.roots(), coverage, "");
    }

    pub fn finish(self) -> Metrics {
        self.metrics
    }

    fn walk(
        &mut self,
        file: &Path,
        tree: &StructuralTree,
        ids: &[NodeId],
        coverage: &LineHits,
        path: &str,
    ) {
        for &id in ids {
            let node = tree.node(id);
            match node.kind {
                NodeKind::Namespace | NodeKind::Class => {
                    let path = join_path(path, &node.name);
                    self.walk(file, tree, &node.children, coverage, &path);
                }
                NodeKind::Function {
                    is_method,
                    is_closure: false,
                } => {
                    let name = self.unique_name(path, &node.name, is_method);
                    tracing::trace!(name = %name, "leaf metrics");
                    self.metrics.add(&name, leaf_metrics(file, node, coverage));
                }
                _ if !node.children.is_empty() => {
                    self.walk(file, tree, &node.children, coverage, path);
                }
                _ => {}
            }
        }
    }
}

impl MetricsAggregator {
    /// Qualified name for a new leaf. A name already taken by an earlier
    /// leaf (same function name in another file, or in a second impl block)
    /// gets a `#2`, `#3`, ... suffix so each leaf keeps `methods == 1`.
    fn unique_name(&self, path: &str, name: &str, is_method: bool) -> String {
        let qualified = qualified_name(path, name, is_method);
        if self.metrics.get(&qualified).is_none() {
            return qualified;
        }
        let unique = (2..)
            .map(|n| qualified_name(path, &format!("{}#{}", name, n), is_method))
            .find(|candidate| self.metrics.get(candidate).is_none())
            .unwrap_or(qualified);
        debug!(name = %unique, "disambiguated duplicate leaf name");
        unique
    }
}

fn join_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}\\{}", path, name)
    }
}

/// `path::name()` for methods, `path\name()` for free functions
pub fn qualified_name(path: &str, name: &str, is_method: bool) -> String {
    let qualified = if is_method {
        format!("{}::{}()", path, name)
    } else {
        format!("{}\\{}()", path, name)
    };
    qualified
        .trim_start_matches(':')
        .trim_start_matches('\\')
        .to_string()
}

/// Measure one function over its inclusive span.
///
/// Lines absent from the filtered map are not coverable; present lines with
/// a zero count are coverable but never ran.
pub fn leaf_metrics(file: &Path, node: &Node, coverage: &LineHits) -> MetricsData {
    let mut data = MetricsData {
        loc: node.span.line_count(),
        methods: 1,
        line: Some(node.span),
        ..Default::default()
    };
    data.files.insert(file.to_path_buf());

    for line in node.span.lines() {
        match coverage.get(&line) {
            None => data.ncloc += 1,
            Some(&count) if count > 0 => {
                data.cloc += 1;
                data.covered += 1;
                data.covered_lines.push(line);
            }
            Some(_) => {
                data.cloc += 1;
                data.uncovered_lines.push(line);
            }
        }
    }
    data.cmethods = usize::from(data.covered > 0);
    data
}
