//! Per-file line hit accumulation for one session.

use super::resolver::PathResolver;
use crate::core::{LineHits, RawCoverage};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
struct FileCoverage {
    hits: LineHits,
    /// Physical line count, read lazily on first merge
    line_count: Option<usize>,
}

/// Additive per-file coverage map restricted to a tracked file set.
///
/// The store is seeded with one empty entry per tracked file, so files that
/// never executed still show up in exports. Updates for any other path are
/// dropped, as are line numbers outside `1..line_count`.
#[derive(Debug, Clone, Default)]
pub struct CoverageStore {
    resolver: PathResolver,
    synthetic: Vec<glob::Pattern>,
    files: BTreeMap<PathBuf, FileCoverage>,
}

impl CoverageStore {
    pub fn new(files: impl IntoIterator<Item = PathBuf>, resolver: PathResolver) -> Self {
        Self {
            resolver,
            synthetic: Vec::new(),
            files: files
                .into_iter()
                .map(|file| (file, FileCoverage::default()))
                .collect(),
        }
    }

    /// Reported paths matching any of these patterns are skipped before
    /// resolution; they denote evaluated or generated code with no file.
    pub fn with_synthetic_patterns(mut self, patterns: Vec<glob::Pattern>) -> Self {
        self.synthetic = patterns;
        self
    }

    /// Merge a driver delta, file by file
    pub fn merge(&mut self, raw: &RawCoverage) {
        for (file, hits) in raw {
            if hits.is_empty() {
                continue;
            }
            self.merge_file(file, hits);
        }
    }

    /// Merge hits for a single reported path, returning how many lines were
    /// accepted.
    pub fn merge_file(&mut self, reported: &Path, hits: &LineHits) -> usize {
        let reported_str = reported.to_string_lossy();
        if self.synthetic.iter().any(|p| p.matches(&reported_str)) {
            log::debug!("Skipping synthetic coverage path: {}", reported_str);
            return 0;
        }

        let resolved = self.resolver.resolve(reported);
        let Some(entry) = self.files.get_mut(&resolved) else {
            log::debug!("Dropping coverage for untracked file: {}", resolved.display());
            return 0;
        };

        let line_count = match entry.line_count {
            Some(count) => count,
            None => match std::fs::read_to_string(&resolved) {
                Ok(content) => {
                    let count = content.lines().count();
                    entry.line_count = Some(count);
                    count
                }
                Err(e) => {
                    log::warn!(
                        "Failed to read {} while merging coverage: {}",
                        resolved.display(),
                        e
                    );
                    return 0;
                }
            },
        };

        let mut accepted = 0;
        for (&line, &count) in hits {
            // Drivers occasionally report line 0 or stale lines past the end
            if line == 0 || line >= line_count {
                log::debug!(
                    "Dropping out-of-range line {} for {} ({} lines)",
                    line,
                    resolved.display(),
                    line_count
                );
                continue;
            }
            let hit = entry.hits.entry(line).or_insert(0);
            *hit = hit.saturating_add(count);
            accepted += 1;
        }
        accepted
    }

    pub fn is_tracked(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    /// Tracked files in path order
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    /// Recorded hits for a tracked file
    pub fn hits(&self, path: &Path) -> Option<&LineHits> {
        self.files.get(path).map(|f| &f.hits)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Raw view of all recorded hits, including empty seeded entries
    pub fn snapshot(&self) -> RawCoverage {
        self.files
            .iter()
            .map(|(path, file)| (path.clone(), file.hits.clone()))
            .collect()
    }
}
