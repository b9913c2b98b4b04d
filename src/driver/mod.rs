//! Coverage drivers.
//!
//! A driver is the flat measurement primitive underneath a session: it can be
//! started, and stopping it drains everything recorded since the last start.
//! Nesting is handled entirely by [`crate::session::SessionStack`]; drivers
//! only need to survive repeated stop/start cycles without losing hits.

pub mod lcov;
pub mod memory;

use crate::core::RawCoverage;

pub use self::lcov::LcovDriver;
pub use memory::{HitRecorder, MemoryDriver};

pub trait CoverageDriver: Send {
    /// Begin recording
    fn start(&mut self);

    /// Stop recording and drain the hits collected since the last `start`
    fn stop(&mut self) -> RawCoverage;

    fn is_running(&self) -> bool;
}

impl<D: CoverageDriver + ?Sized> CoverageDriver for Box<D> {
    fn start(&mut self) {
        (**self).start()
    }

    fn stop(&mut self) -> RawCoverage {
        (**self).stop()
    }

    fn is_running(&self) -> bool {
        (**self).is_running()
    }
}
