//! A single measurement session.

use crate::config::CovstackConfig;
use crate::core::{Error, LineHits, ParseOptions, RawCoverage, Result, StructuralTree};
use crate::coverage::{coverable_lines, CoverageStore, PathResolver};
use crate::driver::CoverageDriver;
use crate::metrics::{Metrics, MetricsAggregator};
use crate::parser::SourceParser;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Filtered coverage keyed by path relative to the session base
pub type CoverageExport = BTreeMap<PathBuf, LineHits>;

/// One measurement scope: a coverage store, the driver feeding it and the
/// parser used to interpret it.
///
/// Parsed trees are cached for the lifetime of the session and shared by
/// [`Session::export`] and [`Session::metrics`].
pub struct Session {
    base: PathBuf,
    store: CoverageStore,
    driver: Box<dyn CoverageDriver>,
    parser: Arc<dyn SourceParser>,
    trees: HashMap<PathBuf, Arc<StructuralTree>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base", &self.base)
            .field("files", &self.store.len())
            .field("running", &self.driver.is_running())
            .field("language", &self.parser.language())
            .field("cached_trees", &self.trees.len())
            .finish()
    }
}

impl Session {
    pub fn builder(
        driver: impl CoverageDriver + 'static,
        parser: Arc<dyn SourceParser>,
    ) -> SessionBuilder {
        SessionBuilder {
            driver: Box::new(driver),
            parser,
            base: PathBuf::from("."),
            prefix: None,
            files: Vec::new(),
            synthetic: Vec::new(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn store(&self) -> &CoverageStore {
        &self.store
    }

    /// Accumulate a driver delta into this session's store
    pub fn merge(&mut self, raw: &RawCoverage) {
        self.store.merge(raw);
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    pub(crate) fn driver_mut(&mut self) -> &mut dyn CoverageDriver {
        self.driver.as_mut()
    }

    /// Parsed tree for `file`, parsing on first use
    pub fn tree(&mut self, file: &Path) -> Result<Arc<StructuralTree>> {
        if let Some(tree) = self.trees.get(file) {
            return Ok(Arc::clone(tree));
        }

        let source = std::fs::read_to_string(file)
            .map_err(|e| Error::file_system("Failed to read source", file, e))?;
        let tree = Arc::new(self.parser.parse(&source, file, ParseOptions { line_index: true })?);
        self.trees.insert(file.to_path_buf(), Arc::clone(&tree));
        Ok(tree)
    }

    /// Filtered coverage of a single file
    pub fn export_file(&mut self, file: &Path) -> Result<LineHits> {
        let tree = self.tree(file)?;
        Ok(coverable_lines(&tree, self.store.hits(file)))
    }

    /// Filtered coverage of every tracked file, keyed relative to the base
    pub fn export(&mut self) -> Result<CoverageExport> {
        let files: Vec<PathBuf> = self.store.files().map(Path::to_path_buf).collect();
        let mut export = CoverageExport::new();
        for file in files {
            let lines = self.export_file(&file)?;
            export.insert(self.relative(&file), lines);
        }
        Ok(export)
    }

    /// Metrics table over every tracked file
    pub fn metrics(&mut self) -> Result<Metrics> {
        let files: Vec<PathBuf> = self.store.files().map(Path::to_path_buf).collect();
        let mut aggregator = MetricsAggregator::new();
        for file in files {
            let tree = self.tree(&file)?;
            let coverage = coverable_lines(&tree, self.store.hits(&file));
            aggregator.add_file(&file, &tree, &coverage);
        }
        Ok(aggregator.finish())
    }

    /// `file` relative to the base, as used for export keys. Files outside
    /// the base keep their path unchanged.
    pub fn relative(&self, file: &Path) -> PathBuf {
        file.strip_prefix(&self.base)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| file.to_path_buf())
    }
}

/// Builder for [`Session`]
pub struct SessionBuilder {
    driver: Box<dyn CoverageDriver>,
    parser: Arc<dyn SourceParser>,
    base: PathBuf,
    prefix: Option<PathBuf>,
    files: Vec<PathBuf>,
    synthetic: Vec<String>,
}

impl SessionBuilder {
    /// Directory that exported paths are made relative to
    #[must_use]
    pub fn base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = base.into();
        self
    }

    /// Instrumentation-cache root stripped from driver-reported paths
    #[must_use]
    pub fn prefix(mut self, prefix: Option<PathBuf>) -> Self {
        self.prefix = prefix;
        self
    }

    /// Tracked file set; each file starts with an empty entry
    #[must_use]
    pub fn files(mut self, files: Vec<PathBuf>) -> Self {
        self.files = files;
        self
    }

    /// Glob patterns for synthetic paths to skip
    #[must_use]
    pub fn synthetic(mut self, patterns: Vec<String>) -> Self {
        self.synthetic = patterns;
        self
    }

    /// Take base, prefix and synthetic patterns from a configuration
    #[must_use]
    pub fn config(self, config: &CovstackConfig) -> Self {
        self.base(config.base.clone())
            .prefix(config.prefix.clone())
            .synthetic(config.scan.synthetic.clone())
    }

    pub fn build(self) -> Result<Session> {
        let synthetic = self
            .synthetic
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let store = CoverageStore::new(self.files, PathResolver::new(self.prefix))
            .with_synthetic_patterns(synthetic);

        Ok(Session {
            base: self.base,
            store,
            driver: self.driver,
            parser: self.parser,
            trees: HashMap::new(),
        })
    }
}
