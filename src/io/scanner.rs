use crate::config::ScanConfig;
use crate::core::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Determines the tracked file set for a session
pub struct FileScanner {
    paths: Vec<PathBuf>,
    include: glob::Pattern,
    exclude: Vec<glob::Pattern>,
    recursive: bool,
}

impl FileScanner {
    pub fn new(paths: Vec<PathBuf>, include: &str) -> Result<Self> {
        Ok(Self {
            paths,
            include: glob::Pattern::new(include)?,
            exclude: Vec::new(),
            recursive: true,
        })
    }

    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        Self::new(config.paths.clone(), &config.include)?
            .with_exclude_patterns(&config.exclude)
            .map(|scanner| scanner.recursive(config.recursive))
    }

    pub fn with_exclude_patterns(mut self, patterns: &[String]) -> Result<Self> {
        self.exclude = patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<std::result::Result<_, _>>()?;
        Ok(self)
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Sorted, de-duplicated list of matching files
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for root in &self.paths {
            if root.is_file() {
                if self.should_track(root) {
                    files.push(root.clone());
                }
                continue;
            }
            if !root.is_dir() {
                log::warn!("Skipping missing scan path: {}", root.display());
                continue;
            }

            let walker = WalkBuilder::new(root)
                .hidden(false)
                .git_ignore(true)
                .max_depth(if self.recursive { None } else { Some(1) })
                .build();

            for entry in walker {
                let entry = entry?;
                let path = entry.path();
                if path.is_file() && self.should_track(path) {
                    files.push(path.to_path_buf());
                }
            }
        }

        files.sort();
        files.dedup();
        log::debug!("Scanned {} tracked files", files.len());
        Ok(files)
    }

    fn should_track(&self, path: &Path) -> bool {
        let matches_include = path
            .file_name()
            .map(|name| self.include.matches(&name.to_string_lossy()))
            .unwrap_or(false);
        if !matches_include {
            return false;
        }

        let path_str = path.to_string_lossy();
        !self.exclude.iter().any(|p| p.matches(&path_str))
    }
}
