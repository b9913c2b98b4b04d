//! Hierarchical metrics table keyed by qualified names.
//!
//! Qualified names use `\` between namespace and class segments, `::` before
//! a method and a trailing `()` on functions and methods:
//!
//! ```text
//! parser\Lexer::next()     namespace parser, class Lexer, method next()
//! parser\tokenize()        namespace parser, function tokenize()
//! ```
//!
//! Adding a leaf sums its counters into every node on its path, so each
//! namespace and class total is exactly the sum of its descendant leaves.

use super::data::MetricsData;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricsKind {
    Namespace,
    Class,
    Function,
    Method,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    name: String,
    kind: MetricsKind,
    data: MetricsData,
    children: BTreeMap<String, Metrics>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Empty root namespace
    pub fn new() -> Self {
        Self::node(String::new(), MetricsKind::Namespace)
    }

    fn node(name: String, kind: MetricsKind) -> Self {
        Self {
            name,
            kind,
            data: MetricsData::default(),
            children: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MetricsKind {
        self.kind
    }

    pub fn data(&self) -> &MetricsData {
        &self.data
    }

    pub fn percent(&self) -> f64 {
        self.data.percent()
    }

    /// Direct children in name order
    pub fn children(&self) -> impl Iterator<Item = &Metrics> {
        self.children.values()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Register a leaf entry and roll its counters up the path
    pub fn add(&mut self, qualified: &str, data: MetricsData) {
        let segments = segments(qualified);
        let Some(last) = segments.len().checked_sub(1) else {
            return;
        };

        self.data.absorb(&data);
        let mut current = self;
        for (index, (name, kind)) in segments.into_iter().enumerate() {
            current = current
                .children
                .entry(name.to_string())
                .or_insert_with(|| Metrics::node(name.to_string(), kind));
            if index == last {
                let line = data.line;
                let covered_lines = data.covered_lines.clone();
                let uncovered_lines = data.uncovered_lines.clone();
                current.data.absorb(&data);
                current.data.line = line;
                current.data.covered_lines.extend(covered_lines);
                current.data.uncovered_lines.extend(uncovered_lines);
            } else {
                current.data.absorb(&data);
            }
        }
    }

    /// Look up a node by qualified name; the empty name is the root
    pub fn get(&self, qualified: &str) -> Option<&Metrics> {
        segments(qualified)
            .into_iter()
            .try_fold(self, |node, (name, _)| node.children.get(name))
    }

    /// Serializable view including derived percentages
    pub fn report(&self) -> MetricsReport<'_> {
        MetricsReport {
            name: &self.name,
            kind: self.kind,
            data: &self.data,
            percent: self.percent(),
            children: self.children.values().map(Metrics::report).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsReport<'a> {
    pub name: &'a str,
    pub kind: MetricsKind,
    #[serde(flatten)]
    pub data: &'a MetricsData,
    pub percent: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MetricsReport<'a>>,
}

/// Split a qualified name into `(segment, kind)` pairs from the root down
fn segments(qualified: &str) -> Vec<(&str, MetricsKind)> {
    let qualified = qualified.trim_start_matches('\\');
    let (path, method) = match qualified.rsplit_once("::") {
        Some((path, method)) => (path, Some(method)),
        None => (qualified, None),
    };

    let mut parts: Vec<(&str, MetricsKind)> = path
        .split('\\')
        .filter(|s| !s.is_empty())
        .map(|s| (s, MetricsKind::Namespace))
        .collect();

    match method {
        Some(method) => {
            if let Some(class) = parts.last_mut() {
                class.1 = MetricsKind::Class;
            }
            parts.push((method, MetricsKind::Method));
        }
        None => {
            if let Some(last) = parts.last_mut() {
                if last.0.ends_with("()") {
                    last.1 = MetricsKind::Function;
                }
            }
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn leaf(loc: usize, covered: usize, cloc: usize) -> MetricsData {
        MetricsData {
            loc,
            ncloc: loc - cloc,
            cloc,
            covered,
            methods: 1,
            cmethods: usize::from(covered > 0),
            ..Default::default()
        }
    }

    #[test]
    fn test_segments_for_method_and_function() {
        assert_eq!(
            segments("app\\Parser::next()"),
            vec![
                ("app", MetricsKind::Namespace),
                ("Parser", MetricsKind::Class),
                ("next()", MetricsKind::Method),
            ]
        );
        assert_eq!(
            segments("\\app\\run()"),
            vec![("app", MetricsKind::Namespace), ("run()", MetricsKind::Function)]
        );
        assert!(segments("").is_empty());
    }

    #[test]
    fn test_class_rollup() {
        let mut metrics = Metrics::new();
        metrics.add("Shape::area()", leaf(10, 8, 10));
        metrics.add("Shape::scale()", leaf(5, 0, 5));

        let class = metrics.get("Shape").unwrap();
        assert_eq!(class.kind(), MetricsKind::Class);
        assert_eq!(class.data().methods, 2);
        assert_eq!(class.data().cmethods, 1);
        assert_eq!(class.data().cloc, 15);
        assert_eq!(class.data().covered, 8);
        assert_eq!(class.percent(), 53.33);
    }

    #[test]
    fn test_namespace_totals_are_sum_of_leaves() {
        let mut metrics = Metrics::new();
        metrics.add("app\\io\\Reader::read()", leaf(4, 2, 3));
        metrics.add("app\\io\\open()", leaf(3, 1, 1));
        metrics.add("app\\main()", leaf(2, 0, 2));

        let io = metrics.get("app\\io").unwrap();
        assert_eq!(io.data().loc, 7);
        assert_eq!(io.data().methods, 2);

        let app = metrics.get("app").unwrap();
        assert_eq!(app.data().loc, 9);
        assert_eq!(app.data().cloc, 6);
        assert_eq!(app.data().covered, 3);
        assert_eq!(app.data().cmethods, 2);

        assert_eq!(metrics.data(), app.data());
    }

    #[test]
    fn test_leaf_keeps_line_details() {
        let mut metrics = Metrics::new();
        let mut data = leaf(3, 1, 2);
        data.line = Some(crate::core::LineSpan::new(4, 6));
        data.uncovered_lines = vec![6];
        metrics.add("run()", data);

        let run = metrics.get("run()").unwrap();
        assert_eq!(run.kind(), MetricsKind::Function);
        assert_eq!(run.data().uncovered_lines, vec![6]);
        assert!(metrics.data().line.is_none());
        assert!(metrics.data().uncovered_lines.is_empty());
    }

    #[test]
    fn test_unknown_name_is_none() {
        let metrics = Metrics::new();
        assert!(metrics.get("missing\\thing()").is_none());
        assert!(metrics.get("").is_some());
    }

    #[test]
    fn test_report_serializes_percent() {
        let mut metrics = Metrics::new();
        metrics.add("Shape::area()", leaf(3, 1, 3));
        let json = serde_json::to_value(metrics.report()).unwrap();
        assert_eq!(json["children"][0]["name"], "Shape");
        assert_eq!(json["children"][0]["percent"], 33.33);
        assert_eq!(json["children"][0]["children"][0]["kind"], "method");
    }
}
