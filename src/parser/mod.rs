//! Source parsers producing [`StructuralTree`]s.
//!
//! Sessions treat parsing as a pure function of the source text; a parser
//! error is returned to the caller unchanged.

pub mod rust;

use crate::core::{ParseOptions, Result, StructuralTree};
use std::path::Path;

pub use rust::RustParser;

/// Parser trait for language-specific structural parsing
pub trait SourceParser: Send + Sync {
    /// Parse source text into a structural tree. `path` is only used to
    /// label errors.
    fn parse(&self, source: &str, path: &Path, options: ParseOptions) -> Result<StructuralTree>;

    /// Get the language this parser handles
    fn language(&self) -> &str;
}
