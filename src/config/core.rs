use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings read from `.covstack.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CovstackConfig {
    /// Directory that exported paths are made relative to
    pub base: PathBuf,

    /// Instrumentation-cache root stripped from driver-reported paths
    pub prefix: Option<PathBuf>,

    pub scan: ScanConfig,
}

impl Default for CovstackConfig {
    fn default() -> Self {
        Self {
            base: PathBuf::from("."),
            prefix: None,
            scan: ScanConfig::default(),
        }
    }
}

/// Which files a session tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Files or directories to scan
    pub paths: Vec<PathBuf>,

    /// Glob matched against file names
    pub include: String,

    /// Globs matched against full paths
    pub exclude: Vec<String>,

    pub recursive: bool,

    /// Globs identifying synthetic code paths that have no backing file
    pub synthetic: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            paths: vec![PathBuf::from("src")],
            include: "*.rs".to_string(),
            exclude: Vec::new(),
            recursive: true,
            synthetic: vec!["<*>".to_string()],
        }
    }
}

impl CovstackConfig {
    /// Check every glob before any scan or session is built
    pub fn validate(&self) -> Result<()> {
        if self.scan.include.trim().is_empty() {
            return Err(Error::Configuration(
                "scan.include must not be empty".to_string(),
            ));
        }
        glob::Pattern::new(&self.scan.include)?;
        for pattern in self.scan.exclude.iter().chain(&self.scan.synthetic) {
            glob::Pattern::new(pattern)?;
        }
        Ok(())
    }
}
