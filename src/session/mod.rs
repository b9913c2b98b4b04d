//! Measurement sessions and their nesting discipline.
//!
//! - [`collector`] - one session: store, driver, parse cache, export, metrics
//! - [`stack`] - LIFO stack enforcing a single running driver

pub mod collector;
pub mod stack;

pub use collector::{CoverageExport, Session, SessionBuilder};
pub use stack::{SessionId, SessionStack};
