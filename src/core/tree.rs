//! Index-addressed structural model of a source file.
//!
//! A parser collaborator produces a [`StructuralTree`] through a
//! [`TreeBuilder`]. Nodes live in a flat arena and refer to each other by
//! [`NodeId`], so traversal never chases owned pointers and the tree can be
//! shared cheaply behind an `Arc`.
//!
//! The per-line index maps every physical line to the nodes whose span ends
//! on it. Coverage filtering only ever asks "does a coverable node end here",
//! which the index answers without walking the tree.

use serde::Serialize;

/// Position of a node inside its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Inclusive, 1-based line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LineSpan {
    pub start: usize,
    pub stop: usize,
}

impl LineSpan {
    /// Create a span, swapping the bounds if they arrive reversed
    pub fn new(start: usize, stop: usize) -> Self {
        if stop < start {
            Self {
                start: stop,
                stop: start,
            }
        } else {
            Self { start, stop }
        }
    }

    /// Number of physical lines covered by the span, never zero
    pub fn line_count(&self) -> usize {
        self.stop - self.start + 1
    }

    pub fn lines(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.stop
    }
}

/// Structural role of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    /// Module or namespace; extends the qualified-name path
    Namespace,
    /// Type-like container (impl block, trait, class); extends the path
    Class,
    /// Function, method or closure
    Function { is_method: bool, is_closure: bool },
    /// Transparent grouping with no naming effect
    Block,
    /// Executable leaf code
    Statement,
}

#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub name: String,
    pub span: LineSpan,
    pub coverable: bool,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

/// Options understood by parser collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Build the per-line index of nodes ending on each line
    pub line_index: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { line_index: true }
    }
}

/// Parsed structural model of one source file
#[derive(Debug, Clone, Serialize)]
pub struct StructuralTree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    line_count: usize,
    /// `line_index[line]` for 1-based `line`; slot 0 is always empty
    #[serde(skip)]
    line_index: Vec<Vec<NodeId>>,
}

impl StructuralTree {
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total physical lines of the parsed source
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Nodes whose span ends exactly on `line`, in pre-order
    pub fn nodes_ending_at(&self, line: usize) -> &[NodeId] {
        self.line_index.get(line).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First coverable node ending on `line`, if any
    pub fn coverable_node_at(&self, line: usize) -> Option<NodeId> {
        self.nodes_ending_at(line)
            .iter()
            .copied()
            .find(|id| self.node(*id).coverable)
    }

    pub fn is_coverable(&self, line: usize) -> bool {
        self.coverable_node_at(line).is_some()
    }

    /// Iterate every node in pre-order
    pub fn preorder(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.node(id).children.iter().rev().copied());
            Some(id)
        })
    }
}

/// Incremental builder used by parsers.
///
/// Children are appended in call order, which parsers keep equal to source
/// order.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        parent: Option<NodeId>,
        kind: NodeKind,
        name: impl Into<String>,
        span: LineSpan,
        coverable: bool,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            name: name.into(),
            span,
            coverable,
            children: Vec::new(),
            parent,
        });
        match parent {
            Some(parent) => self.nodes[parent.index()].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn finish(self, line_count: usize, options: ParseOptions) -> StructuralTree {
        let mut tree = StructuralTree {
            nodes: self.nodes,
            roots: self.roots,
            line_count,
            line_index: Vec::new(),
        };
        if options.line_index {
            let mut index = vec![Vec::new(); line_count + 1];
            let order: Vec<NodeId> = tree.preorder().collect();
            for id in order {
                let stop = tree.node(id).span.stop;
                if let Some(slot) = index.get_mut(stop) {
                    slot.push(id);
                }
            }
            tree.line_index = index;
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StructuralTree {
        let mut b = TreeBuilder::new();
        let ns = b.push(None, NodeKind::Namespace, "app", LineSpan::new(1, 12), false);
        let class = b.push(Some(ns), NodeKind::Class, "Parser", LineSpan::new(2, 11), false);
        let method = b.push(
            Some(class),
            NodeKind::Function {
                is_method: true,
                is_closure: false,
            },
            "next",
            LineSpan::new(3, 6),
            false,
        );
        b.push(Some(method), NodeKind::Statement, "", LineSpan::new(4, 4), true);
        b.push(Some(method), NodeKind::Block, "", LineSpan::new(5, 5), false);
        b.push(Some(method), NodeKind::Statement, "", LineSpan::new(5, 5), true);
        b.finish(13, ParseOptions::default())
    }

    #[test]
    fn test_line_index_lists_nodes_ending_on_line() {
        let tree = sample();
        assert_eq!(tree.nodes_ending_at(4).len(), 1);
        assert_eq!(tree.nodes_ending_at(5).len(), 2);
        assert!(tree.nodes_ending_at(7).is_empty());
        assert!(tree.nodes_ending_at(500).is_empty());
    }

    #[test]
    fn test_first_coverable_node_wins() {
        let tree = sample();
        let id = tree.coverable_node_at(5).unwrap();
        assert_eq!(tree.node(id).kind, NodeKind::Statement);
        assert!(tree.node(tree.nodes_ending_at(5)[0]).kind == NodeKind::Block);
        assert!(!tree.is_coverable(6));
        assert!(!tree.is_coverable(12));
    }

    #[test]
    fn test_preorder_visits_parents_first() {
        let tree = sample();
        let names: Vec<_> = tree
            .preorder()
            .map(|id| tree.node(id).name.as_str())
            .filter(|n| !n.is_empty())
            .collect();
        assert_eq!(names, vec!["app", "Parser", "next"]);
    }

    #[test]
    fn test_line_index_is_optional() {
        let mut b = TreeBuilder::new();
        b.push(None, NodeKind::Statement, "", LineSpan::new(1, 1), true);
        let tree = b.finish(2, ParseOptions { line_index: false });
        assert!(!tree.is_coverable(1));
        assert_eq!(tree.coverable_node_at(1), None);
    }

    #[test]
    fn test_line_span_normalizes_bounds() {
        let span = LineSpan::new(9, 3);
        assert_eq!(span.start, 3);
        assert_eq!(span.line_count(), 7);
        assert_eq!(span.lines().last(), Some(9));
    }
}
