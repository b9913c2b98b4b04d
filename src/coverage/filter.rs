//! Coverable-line filtering.
//!
//! Raw driver data says which lines ran; the structural tree says which lines
//! could run at all. The filtered view keeps exactly the coverable lines,
//! reporting `0` for coverable lines the driver never mentioned and omitting
//! everything else.

use crate::core::{LineHits, StructuralTree};

/// Restrict `hits` to the lines the tree marks coverable.
///
/// A line is coverable when a coverable node ends on it.
pub fn coverable_lines(tree: &StructuralTree, hits: Option<&LineHits>) -> LineHits {
    (1..=tree.line_count())
        .filter(|&line| tree.is_coverable(line))
        .map(|line| {
            let count = hits.and_then(|h| h.get(&line)).copied().unwrap_or(0);
            (line, count)
        })
        .collect()
}
