pub mod errors;
pub mod tree;

use std::collections::BTreeMap;
use std::path::PathBuf;

pub use errors::{Error, Result};
pub use tree::{LineSpan, Node, NodeId, NodeKind, ParseOptions, StructuralTree, TreeBuilder};

/// Hit counts for one file, keyed by 1-based line number
pub type LineHits = BTreeMap<usize, u64>;

/// Raw coverage as reported by a driver: file path to line hits
pub type RawCoverage = BTreeMap<PathBuf, LineHits>;

/// Add every hit of `from` into `into`, never overwriting. Counts saturate
/// at `u64::MAX`.
pub fn accumulate(into: &mut RawCoverage, from: RawCoverage) {
    for (file, hits) in from {
        let lines = into.entry(file).or_default();
        for (line, count) in hits {
            let hit = lines.entry(line).or_insert(0);
            *hit = hit.saturating_add(count);
        }
    }
}
