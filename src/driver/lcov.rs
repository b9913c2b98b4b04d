use super::CoverageDriver;
use crate::core::{accumulate, LineHits, RawCoverage};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const TRACEFILE_EXTENSIONS: [&str; 2] = ["info", "lcov"];

/// Driver backed by LCOV tracefiles written by an external instrumented run.
///
/// Sources are tracefiles or directories containing `*.info` / `*.lcov`
/// files. `start()` records which tracefile versions (path and modification
/// time) already exist; `stop()` returns only tracefiles that appeared or
/// changed while the driver was running. Several drivers can therefore watch
/// the same directory from nested sessions without counting a tracefile
/// twice.
#[derive(Debug, Clone)]
pub struct LcovDriver {
    sources: Vec<PathBuf>,
    /// Tracefile versions already read or present when recording started
    seen: HashSet<TracefileVersion>,
    include_existing: bool,
    started: bool,
    running: bool,
}

type TracefileVersion = (PathBuf, Option<SystemTime>);

impl LcovDriver {
    pub fn new(sources: Vec<PathBuf>) -> Self {
        Self {
            sources,
            seen: HashSet::new(),
            include_existing: false,
            started: false,
            running: false,
        }
    }

    /// Attribute tracefiles that exist before the first `start()` to this
    /// driver, for runs whose instrumented process finished beforehand.
    #[must_use]
    pub fn include_existing(mut self) -> Self {
        self.include_existing = true;
        self
    }

    fn versions(&self) -> Vec<TracefileVersion> {
        self.tracefiles()
            .into_iter()
            .map(|tracefile| {
                let modified = std::fs::metadata(&tracefile)
                    .and_then(|m| m.modified())
                    .ok();
                (tracefile, modified)
            })
            .collect()
    }

    fn tracefiles(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for source in &self.sources {
            if source.is_dir() {
                match std::fs::read_dir(source) {
                    Ok(entries) => files.extend(
                        entries
                            .filter_map(|e| e.ok())
                            .map(|e| e.path())
                            .filter(|p| p.is_file() && is_tracefile(p)),
                    ),
                    Err(e) => log::warn!("Failed to list {}: {}", source.display(), e),
                }
            } else if source.is_file() {
                files.push(source.clone());
            }
        }
        files.sort();
        files.dedup();
        files
    }
}

fn is_tracefile(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| TRACEFILE_EXTENSIONS.contains(&ext))
}

/// Sum the `DA` records of one tracefile into `into`
pub fn read_tracefile(path: &Path, into: &mut RawCoverage) -> Result<(), String> {
    use ::lcov::{Reader, Record};

    let reader = Reader::open_file(path)
        .map_err(|e| format!("Failed to open LCOV file {}: {}", path.display(), e))?;

    let mut current: Option<(PathBuf, LineHits)> = None;
    for record in reader {
        let record = record.map_err(|e| format!("Failed to parse LCOV record: {}", e))?;
        match record {
            Record::SourceFile { path } => {
                flush(&mut current, into);
                current = Some((path, LineHits::new()));
            }
            Record::LineData { line, count, .. } => {
                if let Some((_, hits)) = current.as_mut() {
                    let hit = hits.entry(line as usize).or_insert(0);
                    *hit = hit.saturating_add(count);
                }
            }
            Record::EndOfRecord => flush(&mut current, into),
            _ => {}
        }
    }
    // Tolerate a trailing record without end_of_record
    flush(&mut current, into);
    Ok(())
}

fn flush(current: &mut Option<(PathBuf, LineHits)>, into: &mut RawCoverage) {
    if let Some((file, hits)) = current.take() {
        accumulate(into, RawCoverage::from([(file, hits)]));
    }
}

impl CoverageDriver for LcovDriver {
    fn start(&mut self) {
        if self.running {
            return;
        }
        if !(self.include_existing && !self.started) {
            let baseline = self.versions();
            self.seen.extend(baseline);
        }
        self.started = true;
        self.running = true;
    }

    fn stop(&mut self) -> RawCoverage {
        let mut collected = RawCoverage::new();
        if !self.running {
            return collected;
        }
        self.running = false;

        for version in self.versions() {
            if self.seen.contains(&version) {
                continue;
            }
            match read_tracefile(&version.0, &mut collected) {
                Ok(()) => {
                    log::debug!("Drained tracefile {}", version.0.display());
                    self.seen.insert(version);
                }
                Err(e) => log::warn!("{}", e),
            }
        }

        collected
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
