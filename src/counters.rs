use std::sync::atomic::{AtomicU64, Ordering};

/// Shared run counters, handed around as `Arc<Counters>` so every stage
/// increments the same cells. Relaxed ordering throughout: readers only need
/// eventually-consistent snapshots for progress lines and the final report.
///
/// `processed` ticks once per record a writer receives, whether it ends up
/// written or skipped, so `processed == written + skipped` at rest.
#[derive(Debug, Default)]
pub struct Counters {
    estimated: AtomicU64,
    processed: AtomicU64,
    written: AtomicU64,
    skipped: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_estimated(&self, total: u64) {
        self.estimated.store(total, Ordering::Relaxed);
    }
    pub fn estimated(&self) -> u64 {
        self.estimated.load(Ordering::Relaxed)
    }

    pub fn inc_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn inc_written(&self) {
        self.written.fetch_add(1, Ordering::Relaxed);
    }
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    pub fn inc_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }
}
