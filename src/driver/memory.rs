use super::CoverageDriver;
use crate::core::RawCoverage;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Shared {
    running: bool,
    pending: RawCoverage,
}

/// In-process driver fed through [`HitRecorder`] handles.
///
/// Useful when the measured code reports its own execution (for example a
/// runtime hook or an interpreter), and for exercising sessions in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryDriver {
    shared: Arc<Mutex<Shared>>,
}

/// Cloneable handle that records hits into a [`MemoryDriver`].
///
/// Hits recorded while the driver is stopped are discarded.
#[derive(Debug, Clone)]
pub struct HitRecorder {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorder(&self) -> HitRecorder {
        HitRecorder {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl HitRecorder {
    pub fn hit(&self, file: impl AsRef<Path>, line: usize) {
        self.hit_n(file, line, 1);
    }

    pub fn hit_n(&self, file: impl AsRef<Path>, line: usize, count: u64) {
        let mut shared = self.shared.lock();
        if !shared.running {
            return;
        }
        let hit = shared
            .pending
            .entry(PathBuf::from(file.as_ref()))
            .or_default()
            .entry(line)
            .or_insert(0);
        *hit = hit.saturating_add(count);
    }

    pub fn is_recording(&self) -> bool {
        self.shared.lock().running
    }
}

impl CoverageDriver for MemoryDriver {
    fn start(&mut self) {
        self.shared.lock().running = true;
    }

    fn stop(&mut self) -> RawCoverage {
        let mut shared = self.shared.lock();
        shared.running = false;
        std::mem::take(&mut shared.pending)
    }

    fn is_running(&self) -> bool {
        self.shared.lock().running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hits_only_recorded_while_running() {
        let mut driver = MemoryDriver::new();
        let recorder = driver.recorder();

        recorder.hit("a.rs", 1);
        driver.start();
        recorder.hit("a.rs", 2);
        recorder.hit("a.rs", 2);

        let drained = driver.stop();
        recorder.hit("a.rs", 3);

        let lines = &drained[Path::new("a.rs")];
        assert_eq!(lines.get(&2), Some(&2));
        assert!(!lines.contains_key(&1));
        assert!(!lines.contains_key(&3));
    }

    #[test]
    fn test_stop_drains_pending_hits() {
        let mut driver = MemoryDriver::new();
        let recorder = driver.recorder();

        driver.start();
        recorder.hit_n("a.rs", 4, 3);
        assert_eq!(driver.stop()[Path::new("a.rs")][&4], 3);

        driver.start();
        assert!(driver.stop().is_empty());
    }
}
