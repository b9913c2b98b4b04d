// Export modules for library usage
pub mod cli;
pub mod config;
pub mod core;
pub mod coverage;
pub mod driver;
pub mod io;
pub mod metrics;
pub mod parser;
pub mod session;

// Re-export commonly used types
pub use crate::core::{
    Error, LineHits, LineSpan, Node, NodeId, NodeKind, ParseOptions, RawCoverage, Result,
    StructuralTree, TreeBuilder,
};

pub use crate::config::{load_config, CovstackConfig, ScanConfig};

pub use crate::coverage::{coverable_lines, CoverageStore, PathResolver};

pub use crate::driver::{CoverageDriver, HitRecorder, LcovDriver, MemoryDriver};

pub use crate::io::FileScanner;

pub use crate::metrics::{Metrics, MetricsAggregator, MetricsData, MetricsKind};

pub use crate::parser::{RustParser, SourceParser};

pub use crate::session::{CoverageExport, Session, SessionBuilder, SessionId, SessionStack};
