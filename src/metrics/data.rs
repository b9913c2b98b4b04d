use crate::core::LineSpan;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Line and method counters for one metrics node.
///
/// Leaf entries (functions and methods) are measured directly; every other
/// node holds the sum of the leaves below it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsData {
    /// Physical lines spanned
    pub loc: usize,
    /// Lines that are not coverable
    pub ncloc: usize,
    /// Coverable lines
    pub cloc: usize,
    /// Coverable lines executed at least once
    pub covered: usize,
    pub methods: usize,
    /// Methods with at least one covered line
    pub cmethods: usize,
    pub files: BTreeSet<PathBuf>,
    /// Source span, set on leaf entries only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineSpan>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub covered_lines: Vec<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub uncovered_lines: Vec<usize>,
}

impl MetricsData {
    /// Covered share of coverable lines, in percent with two decimals.
    ///
    /// Nodes without coverable lines report `0.0`.
    pub fn percent(&self) -> f64 {
        if self.cloc == 0 {
            return 0.0;
        }
        let ratio = self.covered as f64 * 100.0 / self.cloc as f64;
        (ratio * 100.0).round() / 100.0
    }

    /// Add the counters of `other`; line details stay with the leaf
    pub fn absorb(&mut self, other: &MetricsData) {
        self.loc += other.loc;
        self.ncloc += other.ncloc;
        self.cloc += other.cloc;
        self.covered += other.covered;
        self.methods += other.methods;
        self.cmethods += other.cmethods;
        self.files.extend(other.files.iter().cloned());
    }
}
