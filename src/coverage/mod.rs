//! Line coverage accumulation and filtering.
//!
//! - [`store`] - additive per-file hit counts over a tracked file set
//! - [`resolver`] - maps driver-reported paths onto tracked paths
//! - [`filter`] - restricts hits to structurally coverable lines

pub mod filter;
pub mod resolver;
pub mod store;

pub use filter::coverable_lines;
pub use resolver::PathResolver;
pub use store::CoverageStore;
